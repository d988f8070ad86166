use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

/// Every failure the engine can surface, as an explicit kind. HTTP status
/// mapping happens only here, at the boundary; nothing inspects message
/// strings.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot book a time in the past")]
    PastDate,

    #[error("Closed on {day}; open days are {open_days}")]
    ClosedDay { day: String, open_days: String },

    #[error("Outside business hours ({open:02}:00 to {close:02}:00)")]
    OutsideHours { open: u8, close: u8 },

    #[error("Time slot unavailable: another appointment occupies this period")]
    SlotUnavailable,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Offering not found")]
    OfferingNotFound,

    #[error("Offering is not currently bookable")]
    OfferingInactive,

    #[error("Appointment is not archived")]
    NotArchived,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::PastDate => (StatusCode::UNPROCESSABLE_ENTITY, "Date is in the past"),
            AppError::ClosedDay { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "Closed on this day"),
            AppError::OutsideHours { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Outside business hours")
            }
            AppError::SlotUnavailable => (StatusCode::CONFLICT, "Time slot unavailable"),
            AppError::InvalidTransition(_) => (StatusCode::CONFLICT, "Invalid status transition"),
            AppError::OfferingNotFound => (StatusCode::NOT_FOUND, "Offering not found"),
            AppError::OfferingInactive => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Offering not bookable")
            }
            AppError::NotArchived => (StatusCode::CONFLICT, "Appointment is not archived"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
