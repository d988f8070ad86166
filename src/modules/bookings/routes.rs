use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    booking_stats, cancel_booking, check_availability, confirm_booking, create_booking,
    delete_booking, get_booking, list_archived, list_bookings, occupied_slots,
    set_booking_status, unarchive_booking, update_booking, verify_by_pin, verify_by_token,
};

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/availability", get(check_availability))
        .route("/occupied", get(occupied_slots))
        .route("/stats", get(booking_stats))
        .route("/archived", get(list_archived))
        .route("/verify/:token", get(verify_by_token))
        .route("/verify-pin", post(verify_by_pin))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/:id/confirm", patch(confirm_booking))
        .route("/:id/cancel", patch(cancel_booking))
        .route("/:id/status", patch(set_booking_status))
        .route("/:id/unarchive", patch(unarchive_booking))
}
