use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

/// A bookable service type, owned by the external catalog. The scheduler
/// only reads it: duration at booking time, name and price at reporting
/// time, `active` as the bookable flag.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Offering {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    pub price: Option<f64>,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
