use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::db::repositories::AppointmentStore;
use crate::error::{AppError, AppResult};

use super::{day_end, day_start, weekday_name, AvailabilityService};

/// Decides whether a candidate interval violates the availability policy or
/// overlaps an existing active appointment. One worker, one calendar: any
/// active appointment in the same period conflicts, whatever its offering.
pub struct ConflictChecker {
    appointments: Arc<dyn AppointmentStore>,
    availability: Arc<AvailabilityService>,
}

impl ConflictChecker {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        availability: Arc<AvailabilityService>,
    ) -> Self {
        Self {
            appointments,
            availability,
        }
    }

    /// Passes silently when `[start, start + duration)` may be booked;
    /// `exclude` skips the appointment being edited. Durations come from
    /// the catalog and are positive by its contract.
    pub async fn ensure_available(
        &self,
        start: OffsetDateTime,
        duration_minutes: i64,
        exclude: Option<Uuid>,
    ) -> AppResult<()> {
        if start <= OffsetDateTime::now_utc() {
            return Err(AppError::PastDate);
        }

        let rules = self.availability.current().await?;
        let weekday = start.weekday().number_days_from_sunday();
        if !rules.is_open_weekday(weekday) {
            return Err(AppError::ClosedDay {
                day: weekday_name(weekday).to_string(),
                open_days: rules.open_day_names(),
            });
        }
        if !rules.is_open_hour(start.hour()) {
            return Err(AppError::OutsideHours {
                open: rules.open_hour,
                close: rules.close_hour,
            });
        }

        let end = start + Duration::minutes(duration_minutes);

        // Same-day active appointments, each with its own snapshotted
        // duration. Intervals are half-open: ending exactly at another's
        // start does not conflict.
        let same_day = self
            .appointments
            .find_active_between(day_start(start.date()), day_end(start.date()), exclude)
            .await?;

        for existing in &same_day {
            if existing.scheduled_at < end && existing.ends_at() > start {
                debug!(
                    candidate_start = %start,
                    existing = %existing.id,
                    "booking rejected: overlapping appointment"
                );
                return Err(AppError::SlotUnavailable);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Appointment, AppointmentStatus};
    use crate::db::repositories::memory::{MemoryAppointmentStore, MemorySettingsStore};
    use time::{Date, PrimitiveDateTime, Time};

    fn checker_with_store() -> (Arc<MemoryAppointmentStore>, ConflictChecker) {
        let store = Arc::new(MemoryAppointmentStore::new());
        let availability =
            Arc::new(AvailabilityService::new(Arc::new(MemorySettingsStore::new())));
        let checker = ConflictChecker::new(store.clone(), availability);
        (store, checker)
    }

    /// A Tuesday at least a week out, at the given time; the default rules
    /// have Tuesday open 8:00 to 18:00.
    fn open_tuesday_at(hour: u8, minute: u8) -> OffsetDateTime {
        let mut day: Date = OffsetDateTime::now_utc().date() + Duration::days(7);
        while day.weekday().number_days_from_sunday() != 2 {
            day = day.next_day().unwrap();
        }
        PrimitiveDateTime::new(day, Time::from_hms(hour, minute, 0).unwrap()).assume_utc()
    }

    fn stored(start: OffsetDateTime, duration_minutes: i64, status: AppointmentStatus) -> Appointment {
        let now = OffsetDateTime::now_utc();
        Appointment {
            id: Uuid::new_v4(),
            client_name: "Dana Reeve".to_string(),
            client_email: "dana@example.com".to_string(),
            client_phone: "5551234567".to_string(),
            scheduled_at: start,
            offering_id: Uuid::new_v4(),
            duration_minutes,
            status,
            archived: false,
            archived_at: None,
            verification_token: Uuid::new_v4().simple().to_string(),
            verification_pin: "1234".to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn rejects_past_dates() {
        let (_, checker) = checker_with_store();
        let yesterday = OffsetDateTime::now_utc() - Duration::days(1);
        assert!(matches!(
            checker.ensure_available(yesterday, 60, None).await,
            Err(AppError::PastDate)
        ));
    }

    #[tokio::test]
    async fn rejects_closed_weekdays() {
        let (_, checker) = checker_with_store();
        // Walk back from an open Tuesday to the preceding Sunday and Monday.
        for offset in [1, 2] {
            let closed = open_tuesday_at(10, 0) - Duration::days(offset);
            assert!(matches!(
                checker.ensure_available(closed, 60, None).await,
                Err(AppError::ClosedDay { .. })
            ));
        }
    }

    #[tokio::test]
    async fn closed_day_message_lists_open_days() {
        let (_, checker) = checker_with_store();
        let sunday = open_tuesday_at(10, 0) - Duration::days(2);
        let err = checker.ensure_available(sunday, 60, None).await.unwrap_err();
        assert!(err.to_string().contains("Tuesday"));
        assert!(err.to_string().contains("Saturday"));
    }

    #[tokio::test]
    async fn rejects_hours_outside_the_window() {
        let (_, checker) = checker_with_store();
        for hour in [7, 18] {
            assert!(matches!(
                checker
                    .ensure_available(open_tuesday_at(hour, 0), 60, None)
                    .await,
                Err(AppError::OutsideHours { .. })
            ));
        }
    }

    #[tokio::test]
    async fn accepts_last_minute_before_closing() {
        let (_, checker) = checker_with_store();
        checker
            .ensure_available(open_tuesday_at(17, 59), 60, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejects_overlap_with_active_appointment() {
        let (store, checker) = checker_with_store();
        let ten = open_tuesday_at(10, 0);
        store
            .insert(&stored(ten, 60, AppointmentStatus::Pending))
            .await
            .unwrap();

        // 10:30 to 11:30 against the existing 10:00 to 11:00.
        assert!(matches!(
            checker
                .ensure_available(open_tuesday_at(10, 30), 60, None)
                .await,
            Err(AppError::SlotUnavailable)
        ));
    }

    #[tokio::test]
    async fn back_to_back_bookings_do_not_conflict() {
        let (store, checker) = checker_with_store();
        store
            .insert(&stored(open_tuesday_at(10, 0), 60, AppointmentStatus::Confirmed))
            .await
            .unwrap();

        // Starting exactly where the other ends.
        checker
            .ensure_available(open_tuesday_at(11, 0), 60, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_and_completed_do_not_constrain() {
        let (store, checker) = checker_with_store();
        let ten = open_tuesday_at(10, 0);
        store
            .insert(&stored(ten, 60, AppointmentStatus::Cancelled))
            .await
            .unwrap();
        store
            .insert(&stored(ten, 60, AppointmentStatus::Completed))
            .await
            .unwrap();

        checker.ensure_available(ten, 60, None).await.unwrap();
    }

    #[tokio::test]
    async fn excluded_appointment_is_ignored() {
        let (store, checker) = checker_with_store();
        let existing = stored(open_tuesday_at(10, 0), 60, AppointmentStatus::Pending);
        store.insert(&existing).await.unwrap();

        // Rescheduling within its own slot is fine.
        checker
            .ensure_available(open_tuesday_at(10, 30), 30, Some(existing.id))
            .await
            .unwrap();
    }
}
