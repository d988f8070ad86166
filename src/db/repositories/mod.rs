mod appointment_repository;
pub mod memory;
mod offering_repository;
mod settings_repository;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::models::{Appointment, BookingFilter, Offering, Setting};
use crate::db::DatabaseError;

pub use appointment_repository::PgAppointmentStore;
pub use offering_repository::PgOfferingCatalog;
pub use settings_repository::PgSettingsStore;

/// Persistence port for appointments. Implementations provide per-operation
/// atomicity: `update` writes the full mutable row in one statement, which
/// is what keeps the completed+archived transition a single observable
/// write.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<(), DatabaseError>;

    async fn update(&self, appointment: &Appointment) -> Result<(), DatabaseError>;

    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DatabaseError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Appointment>, DatabaseError>;

    /// PIN lookup scans active (pending/confirmed) appointments only; PINs
    /// are unique within that set.
    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<Appointment>, DatabaseError>;

    /// Active appointments with `scheduled_at` in `[from, to)`, ascending,
    /// optionally excluding one id (self-exclusion while editing).
    async fn find_active_between(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
        exclude: Option<Uuid>,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    /// Completed appointments with `scheduled_at` in `[from, to)`; open
    /// bounds when `None`.
    async fn find_completed_between(
        &self,
        from: Option<OffsetDateTime>,
        to: Option<OffsetDateTime>,
    ) -> Result<Vec<Appointment>, DatabaseError>;

    /// General listing. Non-archived listings come back ascending by
    /// `scheduled_at`, the archive newest-archived first.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Appointment>, DatabaseError>;
}

/// Read-only port onto the offering catalog (an external collaborator; this
/// service never writes it).
#[async_trait]
pub trait OfferingCatalog: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Offering>, DatabaseError>;
}

/// Keyed JSON configuration rows; `upsert` replaces the whole value
/// atomically so readers never observe a partial config.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Setting>, DatabaseError>;

    async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
        description: Option<&str>,
    ) -> Result<Setting, DatabaseError>;

    async fn all(&self) -> Result<Vec<Setting>, DatabaseError>;
}
