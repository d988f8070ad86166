use thiserror::Error;

/// Failures surfaced by the backing stores. The in-memory stores are
/// infallible; every variant here originates in the Postgres layer.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}
