use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::{
    Appointment, AppointmentStatus, BookingFilter, NewBooking, UpdateBooking,
};
use crate::error::{AppError, AppResult};

pub async fn list_bookings(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> AppResult<Json<Vec<Appointment>>> {
    let filter = BookingFilter {
        archived: false,
        ..filter
    };
    Ok(Json(state.bookings.list(&filter).await?))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<NewBooking>,
) -> AppResult<(StatusCode, Json<Appointment>)> {
    let appointment = state.bookings.create(input).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.get(id).await?))
}

pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBooking>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.update(id, input).await?))
}

pub async fn confirm_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.confirm(id).await?))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.cancel(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: AppointmentStatus,
}

pub async fn set_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.set_status(id, payload.status).await?))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.bookings.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_archived(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> AppResult<Json<Vec<Appointment>>> {
    Ok(Json(state.bookings.archived(&filter).await?))
}

pub async fn unarchive_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.unarchive(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
    pub offering_id: Option<Uuid>,
    pub duration: Option<i64>,
}

/// Public probe the booking frontend calls before submitting: same checks
/// a real booking runs. Accepts either an offering or a bare duration.
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Value>> {
    let duration = match (query.duration, query.offering_id) {
        (Some(duration), _) => {
            if duration <= 0 {
                return Err(AppError::Validation(
                    "duration must be a positive number of minutes".to_string(),
                ));
            }
            duration
        }
        (None, Some(offering_id)) => state.bookings.offering_duration(offering_id).await?,
        (None, None) => {
            return Err(AppError::Validation(
                "either offering_id or duration is required".to_string(),
            ))
        }
    };

    state.bookings.check_slot(query.at, duration).await?;
    Ok(Json(json!({ "available": true })))
}

#[derive(Debug, Deserialize)]
pub struct OccupiedQuery {
    pub date: Date,
}

pub async fn occupied_slots(
    State(state): State<AppState>,
    Query(query): Query<OccupiedQuery>,
) -> AppResult<Json<Value>> {
    let occupied = state.slots.occupied_slots(query.date).await?;
    Ok(Json(json!({ "occupied": occupied })))
}

pub async fn verify_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(state.bookings.verify_by_token(&token).await?))
}

#[derive(Debug, Deserialize)]
pub struct PinPayload {
    pub pin: String,
}

pub async fn verify_by_pin(
    State(state): State<AppState>,
    Json(payload): Json<PinPayload>,
) -> AppResult<Json<Appointment>> {
    if payload.pin.len() != 4 || !payload.pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "PIN must be exactly 4 digits".to_string(),
        ));
    }
    Ok(Json(state.bookings.verify_by_pin(&payload.pin).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub from: Option<Date>,
    pub to: Option<Date>,
}

pub async fn booking_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<crate::scheduling::StatsReport>> {
    Ok(Json(state.stats.aggregate(query.from, query.to).await?))
}
