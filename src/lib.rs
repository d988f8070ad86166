//! Booking backend for a single-chair studio: one worker, one calendar.
//!
//! The scheduling engine guarantees that no two active appointments ever
//! overlap, enforces configurable business hours, runs the appointment
//! status state machine (with exactly-once archiving on completion), mints
//! verification credentials for unauthenticated clients, and aggregates
//! usage statistics over completed work.

pub mod app;
pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod scheduling;
pub mod telemetry;

pub use app_state::AppState;
pub use error::{AppError, AppResult};
