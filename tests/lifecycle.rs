//! End-to-end exercises of the booking state machine over the in-memory
//! stores: conflict-free creation, status transitions, archiving, deletion
//! and verification lookups.

use std::sync::Arc;

use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

use atelier_backend::db::models::{
    AppointmentStatus, BookingFilter, NewBooking, Offering, UpdateBooking,
};
use atelier_backend::db::repositories::memory::{
    MemoryAppointmentStore, MemoryOfferingCatalog, MemorySettingsStore,
};
use atelier_backend::db::repositories::{AppointmentStore, OfferingCatalog, SettingsStore};
use atelier_backend::error::AppError;
use atelier_backend::scheduling::{AvailabilityService, BookingService, ConflictChecker};

struct Harness {
    catalog: Arc<MemoryOfferingCatalog>,
    bookings: BookingService,
}

fn harness() -> Harness {
    let store: Arc<dyn AppointmentStore> = Arc::new(MemoryAppointmentStore::new());
    let catalog = Arc::new(MemoryOfferingCatalog::new());
    let settings: Arc<dyn SettingsStore> = Arc::new(MemorySettingsStore::new());

    let availability = Arc::new(AvailabilityService::new(settings));
    let checker = Arc::new(ConflictChecker::new(store.clone(), availability));
    let dyn_catalog: Arc<dyn OfferingCatalog> = catalog.clone();
    let bookings = BookingService::new(store, dyn_catalog, checker);

    Harness { catalog, bookings }
}

fn offering(duration_minutes: i64, price: Option<f64>, active: bool) -> Offering {
    let now = OffsetDateTime::now_utc();
    Offering {
        id: Uuid::new_v4(),
        name: "Gel Manicure".to_string(),
        duration_minutes,
        price,
        active,
        created_at: now,
        updated_at: now,
    }
}

/// A Tuesday at least a week out at the given time; the default rules have
/// Tuesday open 8:00 to 18:00.
fn open_tuesday_at(hour: u8, minute: u8) -> OffsetDateTime {
    let mut day = OffsetDateTime::now_utc().date() + Duration::days(7);
    while day.weekday().number_days_from_sunday() != 2 {
        day = day.next_day().unwrap();
    }
    PrimitiveDateTime::new(day, Time::from_hms(hour, minute, 0).unwrap()).assume_utc()
}

fn booking_at(offering_id: Uuid, start: OffsetDateTime) -> NewBooking {
    NewBooking {
        client_name: "Lena Okafor".to_string(),
        client_email: "lena@example.com".to_string(),
        client_phone: "5552223333".to_string(),
        scheduled_at: start,
        offering_id,
        notes: None,
    }
}

#[tokio::test]
async fn booking_mints_credentials_and_starts_pending() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert!(!appointment.archived);
    assert!(appointment.archived_at.is_none());
    assert_eq!(appointment.verification_token.len(), 32);
    assert_eq!(appointment.verification_pin.len(), 4);
    assert!(appointment.verification_pin.chars().all(|c| c.is_ascii_digit()));
    assert_eq!(appointment.duration_minutes, 60);
}

#[tokio::test]
async fn overlap_is_rejected_but_back_to_back_is_not() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    h.bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    // 10:30 against the existing 10:00 to 11:00.
    let conflict = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 30)))
        .await;
    assert!(matches!(conflict, Err(AppError::SlotUnavailable)));

    // Exactly at the boundary: half-open intervals touch without overlap.
    h.bookings
        .create(booking_at(service.id, open_tuesday_at(11, 0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn successful_bookings_never_overlap() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    for (hour, minute) in [(10, 0), (10, 15), (10, 30), (11, 0), (11, 45), (12, 0), (13, 0)] {
        // Some of these fail; the surviving set must be conflict-free.
        let _ = h
            .bookings
            .create(booking_at(service.id, open_tuesday_at(hour, minute)))
            .await;
    }

    let booked = h.bookings.list(&BookingFilter::default()).await.unwrap();
    assert!(!booked.is_empty());
    for a in &booked {
        for b in &booked {
            if a.id == b.id {
                continue;
            }
            let disjoint = a.ends_at() <= b.scheduled_at || b.ends_at() <= a.scheduled_at;
            assert!(disjoint, "{} and {} overlap", a.id, b.id);
        }
    }
}

#[tokio::test]
async fn create_validates_client_fields() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let mut short_name = booking_at(service.id, open_tuesday_at(10, 0));
    short_name.client_name = "A".to_string();
    assert!(matches!(
        h.bookings.create(short_name).await,
        Err(AppError::Validation(_))
    ));

    let mut bad_email = booking_at(service.id, open_tuesday_at(10, 0));
    bad_email.client_email = "not-an-email".to_string();
    assert!(matches!(
        h.bookings.create(bad_email).await,
        Err(AppError::Validation(_))
    ));

    let mut short_phone = booking_at(service.id, open_tuesday_at(10, 0));
    short_phone.client_phone = "12345".to_string();
    assert!(matches!(
        h.bookings.create(short_phone).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn create_rejects_missing_or_inactive_offering() {
    let h = harness();

    assert!(matches!(
        h.bookings
            .create(booking_at(Uuid::new_v4(), open_tuesday_at(10, 0)))
            .await,
        Err(AppError::OfferingNotFound)
    ));

    let retired = offering(60, Some(35.0), false);
    h.catalog.insert(retired.clone()).await;
    assert!(matches!(
        h.bookings
            .create(booking_at(retired.id, open_tuesday_at(10, 0)))
            .await,
        Err(AppError::OfferingInactive)
    ));
}

#[tokio::test]
async fn confirm_only_from_pending() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    let confirmed = h.bookings.confirm(appointment.id).await.unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    assert!(matches!(
        h.bookings.confirm(appointment.id).await,
        Err(AppError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn cancel_guards_terminal_states() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    h.bookings.cancel(appointment.id).await.unwrap();
    assert!(matches!(
        h.bookings.cancel(appointment.id).await,
        Err(AppError::InvalidTransition(_))
    ));

    let completed = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(14, 0)))
        .await
        .unwrap();
    h.bookings
        .set_status(completed.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    assert!(matches!(
        h.bookings.cancel(completed.id).await,
        Err(AppError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn completing_archives_in_the_same_write() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    h.bookings
        .set_status(appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    // Read back through the store: one write carried both fields.
    let stored = h.bookings.get(appointment.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert!(stored.archived);
    assert!(stored.archived_at.is_some());
}

#[tokio::test]
async fn other_statuses_leave_the_archive_flag_alone() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    let updated = h
        .bookings
        .set_status(appointment.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert!(!updated.archived);
    assert!(updated.archived_at.is_none());
}

#[tokio::test]
async fn unarchive_restores_listing_but_not_status() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    assert!(matches!(
        h.bookings.unarchive(appointment.id).await,
        Err(AppError::NotArchived)
    ));

    h.bookings
        .set_status(appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    let archived = h.bookings.archived(&BookingFilter::default()).await.unwrap();
    assert_eq!(archived.len(), 1);

    let restored = h.bookings.unarchive(appointment.id).await.unwrap();
    assert_eq!(restored.status, AppointmentStatus::Completed);
    assert!(!restored.archived);
    assert!(restored.archived_at.is_none());
}

#[tokio::test]
async fn delete_only_when_cancelled() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    assert!(matches!(
        h.bookings.delete(appointment.id).await,
        Err(AppError::InvalidTransition(_))
    ));

    h.bookings.cancel(appointment.id).await.unwrap();
    h.bookings.delete(appointment.id).await.unwrap();

    assert!(matches!(
        h.bookings.get(appointment.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_rechecks_conflicts_excluding_itself() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let first = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();
    let second = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(11, 0)))
        .await
        .unwrap();

    // Moving the second onto the first fails.
    let onto_first = UpdateBooking {
        scheduled_at: Some(open_tuesday_at(10, 30)),
        ..UpdateBooking::default()
    };
    assert!(matches!(
        h.bookings.update(second.id, onto_first).await,
        Err(AppError::SlotUnavailable)
    ));

    // Moving the first half an hour earlier is fine: its old slot does not
    // count against it, and 9:30 to 10:30 touches nothing else.
    let nudge = UpdateBooking {
        scheduled_at: Some(open_tuesday_at(9, 30)),
        ..UpdateBooking::default()
    };
    h.bookings.update(first.id, nudge).await.unwrap();
}

#[tokio::test]
async fn update_resnapshots_duration_on_offering_change() {
    let h = harness();
    let long = offering(60, Some(35.0), true);
    let short = Offering {
        name: "Polish Change".to_string(),
        ..offering(30, Some(20.0), true)
    };
    h.catalog.insert(long.clone()).await;
    h.catalog.insert(short.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(long.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();
    assert_eq!(appointment.duration_minutes, 60);

    let swap = UpdateBooking {
        offering_id: Some(short.id),
        ..UpdateBooking::default()
    };
    let updated = h.bookings.update(appointment.id, swap).await.unwrap();
    assert_eq!(updated.duration_minutes, 30);
    assert_eq!(updated.offering_id, short.id);
}

#[tokio::test]
async fn terminal_appointments_cannot_be_edited() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();
    h.bookings.cancel(appointment.id).await.unwrap();

    let rename = UpdateBooking {
        client_name: Some("Someone Else".to_string()),
        ..UpdateBooking::default()
    };
    assert!(matches!(
        h.bookings.update(appointment.id, rename).await,
        Err(AppError::InvalidTransition(_))
    ));
}

#[tokio::test]
async fn verification_lookups() {
    let h = harness();
    let service = offering(60, Some(35.0), true);
    h.catalog.insert(service.clone()).await;

    let appointment = h
        .bookings
        .create(booking_at(service.id, open_tuesday_at(10, 0)))
        .await
        .unwrap();

    let by_token = h
        .bookings
        .verify_by_token(&appointment.verification_token)
        .await
        .unwrap();
    assert_eq!(by_token.id, appointment.id);

    let by_pin = h
        .bookings
        .verify_by_pin(&appointment.verification_pin)
        .await
        .unwrap();
    assert_eq!(by_pin.id, appointment.id);

    assert!(matches!(
        h.bookings.verify_by_token("nosuchtoken").await,
        Err(AppError::NotFound(_))
    ));

    // Cancelled appointments drop out of the active PIN space; the token
    // still resolves.
    h.bookings.cancel(appointment.id).await.unwrap();
    assert!(matches!(
        h.bookings.verify_by_pin(&appointment.verification_pin).await,
        Err(AppError::NotFound(_))
    ));
    h.bookings
        .verify_by_token(&appointment.verification_token)
        .await
        .unwrap();
}

#[tokio::test]
async fn mutations_on_unknown_ids_fail_not_found() {
    let h = harness();
    let missing = Uuid::new_v4();

    assert!(matches!(h.bookings.get(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(h.bookings.confirm(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(h.bookings.cancel(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(h.bookings.delete(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(h.bookings.unarchive(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        h.bookings
            .set_status(missing, AppointmentStatus::Confirmed)
            .await,
        Err(AppError::NotFound(_))
    ));
}
