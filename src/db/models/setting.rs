use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One keyed configuration row; the value is free-form JSON interpreted by
/// whoever owns the key.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
