//! The scheduling engine: availability policy, conflict detection, slot
//! occupancy, the appointment lifecycle, verification credentials and usage
//! statistics. Everything in here works against the store ports in
//! [`crate::db::repositories`], so the engine runs identically over
//! Postgres and the in-memory stores.

pub mod availability;
pub mod conflict;
pub mod lifecycle;
pub mod slots;
pub mod stats;
pub mod verification;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

pub use availability::{AvailabilityRules, AvailabilityService};
pub use conflict::ConflictChecker;
pub use lifecycle::BookingService;
pub use slots::SlotService;
pub use stats::{GroupStats, StatsReport, StatsService};

/// Midnight opening the given calendar day, in the service's fixed zone.
pub fn day_start(day: Date) -> OffsetDateTime {
    PrimitiveDateTime::new(day, Time::MIDNIGHT).assume_utc()
}

/// Exclusive end of the given calendar day (midnight of the next day).
pub fn day_end(day: Date) -> OffsetDateTime {
    match day.next_day() {
        Some(next) => day_start(next),
        None => PrimitiveDateTime::new(day, Time::MAX).assume_utc(),
    }
}

pub(crate) fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "unknown",
    }
}
