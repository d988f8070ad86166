use std::sync::Arc;

use sqlx::PgPool;

use crate::config;
use crate::db::repositories::{
    AppointmentStore, OfferingCatalog, PgAppointmentStore, PgOfferingCatalog, PgSettingsStore,
    SettingsStore,
};
use crate::scheduling::{
    AvailabilityService, BookingService, ConflictChecker, SlotService, StatsService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub availability: Arc<AvailabilityService>,
    pub bookings: Arc<BookingService>,
    pub slots: Arc<SlotService>,
    pub stats: Arc<StatsService>,
}

impl AppState {
    /// Wire the engine over the Postgres stores.
    pub fn new(db: PgPool, env: config::Config) -> Self {
        let appointments: Arc<dyn AppointmentStore> =
            Arc::new(PgAppointmentStore::new(db.clone()));
        let catalog: Arc<dyn OfferingCatalog> = Arc::new(PgOfferingCatalog::new(db.clone()));
        let settings: Arc<dyn SettingsStore> = Arc::new(PgSettingsStore::new(db.clone()));

        let availability = Arc::new(AvailabilityService::new(settings));
        let checker = Arc::new(ConflictChecker::new(
            appointments.clone(),
            availability.clone(),
        ));
        let bookings = Arc::new(BookingService::new(
            appointments.clone(),
            catalog.clone(),
            checker,
        ));
        let slots = Arc::new(SlotService::new(appointments.clone()));
        let stats = Arc::new(StatsService::new(appointments, catalog));

        Self {
            db,
            env,
            availability,
            bookings,
            slots,
            stats,
        }
    }
}
