use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Per-request span plus a completion line with status and latency.
pub async fn observability_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str())
        .unwrap_or("unknown")
        .to_string();

    let span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span).await;
    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        method = %method,
        route = %route,
        status,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );

    response
}
