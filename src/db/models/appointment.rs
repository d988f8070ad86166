use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, Duration, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Pending and confirmed appointments occupy the calendar; cancelled and
    /// completed ones never constrain new bookings.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Terminal for editing: time and offering can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub offering_id: Uuid,
    /// Snapshotted from the offering at booking time; editing the offering
    /// later never moves an existing appointment's interval.
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub archived: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub archived_at: Option<OffsetDateTime>,
    pub verification_token: String,
    pub verification_pin: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Appointment {
    pub fn ends_at(&self) -> OffsetDateTime {
        self.scheduled_at + Duration::minutes(self.duration_minutes)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBooking {
    #[validate(length(min = 2, message = "client name must have at least 2 characters"))]
    pub client_name: String,
    #[validate(email(message = "client email must be a valid address"))]
    pub client_email: String,
    #[validate(length(min = 10, message = "client phone must have at least 10 characters"))]
    pub client_phone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_at: OffsetDateTime,
    pub offering_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBooking {
    #[validate(length(min = 2, message = "client name must have at least 2 characters"))]
    pub client_name: Option<String>,
    #[validate(email(message = "client email must be a valid address"))]
    pub client_email: Option<String>,
    #[validate(length(min = 10, message = "client phone must have at least 10 characters"))]
    pub client_phone: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
    pub offering_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl UpdateBooking {
    /// True when the update would move the appointment's interval and must
    /// go back through the conflict checker.
    pub fn reschedules(&self) -> bool {
        self.scheduled_at.is_some() || self.offering_id.is_some()
    }
}

/// Listing filter; `archived` selects between the default listing and the
/// archive, the date range is inclusive of both whole days.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub status: Option<AppointmentStatus>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    #[serde(default)]
    pub archived: bool,
}
