use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::{
    Appointment, AppointmentStatus, BookingFilter, NewBooking, Offering, UpdateBooking,
};
use crate::db::repositories::{AppointmentStore, OfferingCatalog};
use crate::error::{AppError, AppResult};

use super::{verification, ConflictChecker};

/// Attempts to find a PIN unused by any active appointment before minting
/// gives up.
const PIN_MINT_ATTEMPTS: u32 = 8;

/// The appointment state machine: creation, editing, the status
/// transitions, archiving and deletion. Conflict-sensitive mutations are
/// serialized through one async mutex held across check + persist, so two
/// concurrent booking requests can never both pass the conflict check and
/// double-book the worker.
pub struct BookingService {
    appointments: Arc<dyn AppointmentStore>,
    catalog: Arc<dyn OfferingCatalog>,
    checker: Arc<ConflictChecker>,
    write_lock: Mutex<()>,
}

impl BookingService {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        catalog: Arc<dyn OfferingCatalog>,
        checker: Arc<ConflictChecker>,
    ) -> Self {
        Self {
            appointments,
            catalog,
            checker,
            write_lock: Mutex::new(()),
        }
    }

    /// Book a new appointment: validate the client fields, resolve the
    /// offering, clear the conflict checker, mint credentials, persist as
    /// pending.
    pub async fn create(&self, input: NewBooking) -> AppResult<Appointment> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let _guard = self.write_lock.lock().await;

        let offering = self.bookable_offering(input.offering_id).await?;
        self.checker
            .ensure_available(input.scheduled_at, offering.duration_minutes, None)
            .await?;

        let pin = self.allocate_pin().await?;
        let now = OffsetDateTime::now_utc();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_name: input.client_name,
            client_email: input.client_email,
            client_phone: input.client_phone,
            scheduled_at: input.scheduled_at,
            offering_id: offering.id,
            duration_minutes: offering.duration_minutes,
            status: AppointmentStatus::Pending,
            archived: false,
            archived_at: None,
            verification_token: verification::mint_token(),
            verification_pin: pin,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.appointments.insert(&appointment).await?;

        info!(appointment = %appointment.id, scheduled_at = %appointment.scheduled_at, "appointment booked");
        Ok(appointment)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Appointment> {
        self.require(id).await
    }

    pub async fn list(&self, filter: &BookingFilter) -> AppResult<Vec<Appointment>> {
        Ok(self.appointments.list(filter).await?)
    }

    /// Edit client fields and, while the appointment is still pending or
    /// confirmed, its time or offering. Rescheduling re-snapshots the
    /// duration and goes back through the conflict checker, excluding the
    /// appointment itself.
    pub async fn update(&self, id: Uuid, input: UpdateBooking) -> AppResult<Appointment> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let _guard = self.write_lock.lock().await;

        let mut appointment = self.require(id).await?;
        if appointment.status.is_terminal() {
            return Err(AppError::InvalidTransition(
                "cancelled and completed appointments cannot be edited".to_string(),
            ));
        }

        if input.reschedules() {
            let offering_id = input.offering_id.unwrap_or(appointment.offering_id);
            let start = input.scheduled_at.unwrap_or(appointment.scheduled_at);
            let offering = self.bookable_offering(offering_id).await?;
            self.checker
                .ensure_available(start, offering.duration_minutes, Some(id))
                .await?;

            appointment.scheduled_at = start;
            appointment.offering_id = offering.id;
            appointment.duration_minutes = offering.duration_minutes;
        }

        if let Some(name) = input.client_name {
            appointment.client_name = name;
        }
        if let Some(email) = input.client_email {
            appointment.client_email = email;
        }
        if let Some(phone) = input.client_phone {
            appointment.client_phone = phone;
        }
        if let Some(notes) = input.notes {
            appointment.notes = Some(notes);
        }

        appointment.updated_at = OffsetDateTime::now_utc();
        self.appointments.update(&appointment).await?;
        Ok(appointment)
    }

    /// Pending -> confirmed; nothing else confirms.
    pub async fn confirm(&self, id: Uuid) -> AppResult<Appointment> {
        let mut appointment = self.require(id).await?;
        if appointment.status != AppointmentStatus::Pending {
            return Err(AppError::InvalidTransition(
                "only pending appointments can be confirmed".to_string(),
            ));
        }
        appointment.status = AppointmentStatus::Confirmed;
        appointment.updated_at = OffsetDateTime::now_utc();
        self.appointments.update(&appointment).await?;
        Ok(appointment)
    }

    /// Anything not already cancelled and not completed can be cancelled.
    pub async fn cancel(&self, id: Uuid) -> AppResult<Appointment> {
        let mut appointment = self.require(id).await?;
        match appointment.status {
            AppointmentStatus::Cancelled => {
                return Err(AppError::InvalidTransition(
                    "appointment is already cancelled".to_string(),
                ))
            }
            AppointmentStatus::Completed => {
                return Err(AppError::InvalidTransition(
                    "a completed appointment cannot be cancelled".to_string(),
                ))
            }
            _ => {}
        }
        appointment.status = AppointmentStatus::Cancelled;
        appointment.updated_at = OffsetDateTime::now_utc();
        self.appointments.update(&appointment).await?;
        Ok(appointment)
    }

    /// Generic status update. Completing also archives, in the same store
    /// write; other statuses leave the archive flag alone.
    pub async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> AppResult<Appointment> {
        let mut appointment = self.require(id).await?;
        let now = OffsetDateTime::now_utc();

        appointment.status = status;
        if status == AppointmentStatus::Completed {
            appointment.archived = true;
            appointment.archived_at = Some(now);
        }
        appointment.updated_at = now;
        self.appointments.update(&appointment).await?;

        info!(appointment = %id, status = ?status, "appointment status updated");
        Ok(appointment)
    }

    pub async fn archived(&self, filter: &BookingFilter) -> AppResult<Vec<Appointment>> {
        let filter = BookingFilter {
            archived: true,
            ..filter.clone()
        };
        Ok(self.appointments.list(&filter).await?)
    }

    /// Bring an archived appointment back into the default listings. Its
    /// status stays whatever it was (normally completed).
    pub async fn unarchive(&self, id: Uuid) -> AppResult<Appointment> {
        let mut appointment = self.require(id).await?;
        if !appointment.archived {
            return Err(AppError::NotArchived);
        }
        appointment.archived = false;
        appointment.archived_at = None;
        appointment.updated_at = OffsetDateTime::now_utc();
        self.appointments.update(&appointment).await?;
        Ok(appointment)
    }

    /// Permanent removal, restricted to cancelled appointments.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let appointment = self.require(id).await?;
        if appointment.status != AppointmentStatus::Cancelled {
            return Err(AppError::InvalidTransition(
                "only cancelled appointments can be deleted".to_string(),
            ));
        }
        self.appointments.delete(id).await?;
        info!(appointment = %id, "appointment deleted");
        Ok(())
    }

    /// Unauthenticated lookup by the opaque token minted at creation.
    pub async fn verify_by_token(&self, token: &str) -> AppResult<Appointment> {
        self.appointments
            .find_by_token(token)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no appointment matches this verification token".to_string())
            })
    }

    /// Unauthenticated lookup by PIN; PINs are unique among active
    /// appointments, so a match is unambiguous.
    pub async fn verify_by_pin(&self, pin: &str) -> AppResult<Appointment> {
        self.appointments
            .find_active_by_pin(pin)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("no active appointment matches this PIN".to_string())
            })
    }

    /// Duration for an availability probe: an explicit offering resolved
    /// through the catalog.
    pub async fn offering_duration(&self, offering_id: Uuid) -> AppResult<i64> {
        let offering = self
            .catalog
            .get(offering_id)
            .await?
            .ok_or(AppError::OfferingNotFound)?;
        Ok(offering.duration_minutes)
    }

    /// Availability probe used by the public calendar, same checks a real
    /// booking would run.
    pub async fn check_slot(&self, start: OffsetDateTime, duration_minutes: i64) -> AppResult<()> {
        self.checker.ensure_available(start, duration_minutes, None).await
    }

    async fn require(&self, id: Uuid) -> AppResult<Appointment> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
    }

    async fn bookable_offering(&self, id: Uuid) -> AppResult<Offering> {
        let offering = self
            .catalog
            .get(id)
            .await?
            .ok_or(AppError::OfferingNotFound)?;
        if !offering.active {
            return Err(AppError::OfferingInactive);
        }
        Ok(offering)
    }

    /// PINs are only 4 digits; keep re-minting until one is free among the
    /// active appointments, bounded so a near-full PIN space surfaces as an
    /// error instead of a spin.
    async fn allocate_pin(&self) -> AppResult<String> {
        for _ in 0..PIN_MINT_ATTEMPTS {
            let pin = verification::mint_pin();
            if self.appointments.find_active_by_pin(&pin).await?.is_none() {
                return Ok(pin);
            }
            warn!("verification PIN collision, re-minting");
        }
        Err(AppError::Internal(
            "could not allocate a unique verification PIN".to_string(),
        ))
    }
}
