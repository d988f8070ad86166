use axum::{extract::State, Json};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::scheduling::AvailabilityRules;

pub async fn get_availability(State(state): State<AppState>) -> AppResult<Json<AvailabilityRules>> {
    Ok(Json(state.availability.current().await?))
}

/// Fully replaces the business-hours configuration.
pub async fn put_availability(
    State(state): State<AppState>,
    Json(rules): Json<AvailabilityRules>,
) -> AppResult<Json<AvailabilityRules>> {
    Ok(Json(state.availability.save(rules).await?))
}

pub async fn list_settings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<crate::db::models::Setting>>> {
    Ok(Json(state.availability.all_settings().await?))
}
