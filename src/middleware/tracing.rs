use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::{
    global,
    trace::{Span, SpanKind, Status, Tracer},
    KeyValue,
};
use std::time::Instant;
use tracing::{info_span, Instrument};

/// Per-request observability: an OpenTelemetry server span plus a tracing
/// span carrying a v7 request id, latency and status.
pub async fn observability_middleware(
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = matched_path.as_str().to_string();
    let start_time = Instant::now();

    let tracer = global::tracer("http-server");
    let mut span = tracer
        .span_builder(format!("{} {}", method, route))
        .with_kind(SpanKind::Server)
        .start(&tracer);
    span.set_attribute(KeyValue::new("http.method", method.to_string()));
    span.set_attribute(KeyValue::new("http.url", uri.to_string()));
    span.set_attribute(KeyValue::new("http.route", route.clone()));

    let tracing_span = info_span!(
        "http_request",
        method = %method,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    let response = next.run(request).instrument(tracing_span).await;

    let status_code = response.status().as_u16();
    span.set_attribute(KeyValue::new("http.status_code", i64::from(status_code)));
    span.set_attribute(KeyValue::new(
        "http.response_time_ms",
        start_time.elapsed().as_millis() as i64,
    ));
    if status_code >= 500 {
        span.set_status(Status::Error {
            description: format!("HTTP {}", status_code).into(),
        });
    } else {
        span.set_status(Status::Ok);
    }
    span.end();

    response
}
