use std::collections::BTreeSet;
use std::sync::Arc;

use time::{Date, Duration};

use crate::db::repositories::AppointmentStore;
use crate::error::AppResult;

use super::{day_end, day_start};

/// Derives which fixed hour-granularity display slots a day's active
/// appointments touch, for graying out calendar cells. Pure read: nothing
/// here is ever stored.
pub struct SlotService {
    appointments: Arc<dyn AppointmentStore>,
}

impl SlotService {
    pub fn new(appointments: Arc<dyn AppointmentStore>) -> Self {
        Self { appointments }
    }

    /// Occupied hour labels ("09:00") for the given day, deduplicated and
    /// ascending. An hour cell is occupied when an appointment overlaps any
    /// part of it under the same half-open rule the conflict checker uses:
    /// an appointment ending exactly on the hour leaves that hour free, one
    /// touching a single minute of it does not.
    pub async fn occupied_slots(&self, day: Date) -> AppResult<Vec<String>> {
        let appointments = self
            .appointments
            .find_active_between(day_start(day), day_end(day), None)
            .await?;

        let mut hours: BTreeSet<u8> = BTreeSet::new();
        for appointment in &appointments {
            let start = appointment.scheduled_at;
            let end = appointment.ends_at();

            // Hours the interval can touch within this day; an interval
            // running past midnight is clamped to the day's last cell.
            let last_hour = if end.date() > day { 23 } else { end.hour() };
            for hour in start.hour()..=last_hour {
                let cell_start = day_start(day) + Duration::hours(i64::from(hour));
                let cell_end = cell_start + Duration::hours(1);
                if start < cell_end && end > cell_start {
                    hours.insert(hour);
                }
            }
        }

        Ok(hours.iter().map(|hour| format!("{hour:02}:00")).collect())
    }
}
