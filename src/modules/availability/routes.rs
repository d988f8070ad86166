use axum::{routing::get, Router};

use crate::app_state::AppState;

use super::handlers::{get_availability, list_settings, put_availability};

pub fn availability_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_availability).put(put_availability))
        .route("/settings", get(list_settings))
}
