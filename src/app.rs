use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{availability::routes::availability_routes, bookings::routes::booking_routes},
};

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.env.app.frontend_origin);

    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .nest("/api/bookings", booking_routes())
        .nest("/api/availability", availability_routes())
        .layer(cors)
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

/// Allow the booking frontend's origin; a permissive layer is the fallback
/// when the configured origin is not a valid header value.
fn cors_layer(frontend_origin: &str) -> CorsLayer {
    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => CorsLayer::permissive(),
    }
}

async fn banner() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "bookings": "/api/bookings",
            "availability": "/api/availability",
            "health": "/health",
        },
    }))
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": "ok",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
        }
    }))
}
