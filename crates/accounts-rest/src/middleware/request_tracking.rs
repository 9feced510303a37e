//! Per-request metrics and access log.

use accounts_service::metrics::names;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::{info, warn};

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Counts and times every request by method, route template and status,
/// then writes one access-log event.
///
/// The route label is the template (`/api/v1/users/:id`), never the raw
/// path, so user ids and emails stay out of the label set.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_string(), |path| path.as_str().to_owned());
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();
    let labels = [
        ("method", method.clone()),
        ("route", route.clone()),
        ("status", status.as_u16().to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(elapsed.as_secs_f64());

    if status.is_server_error() {
        warn!(
            target: "http",
            method = %method,
            route = %route,
            uri = %uri,
            status = status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "HTTP request failed"
        );
    } else {
        info!(
            target: "http",
            method = %method,
            route = %route,
            status = status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "HTTP request completed"
        );
    }

    response
}
