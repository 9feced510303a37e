//! Prometheus metrics for the user cache, user operations and HTTP requests.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names.
pub mod names {
    /// Lookups answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "accounts_cache_hits_total";
    /// Lookups that fell through to the record store.
    pub const CACHE_MISSES_TOTAL: &str = "accounts_cache_misses_total";
    /// Duration of single cache store calls, labelled by operation.
    pub const CACHE_OPERATION_DURATION_SECONDS: &str = "accounts_cache_operation_duration_seconds";
    /// User operations, labelled by operation and success.
    pub const USER_OPERATIONS_TOTAL: &str = "accounts_user_operations_total";
    /// HTTP requests, labelled by method, matched route and status.
    pub const HTTP_REQUESTS_TOTAL: &str = "accounts_http_requests_total";
    /// HTTP request latency, same labels as the request counter.
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "accounts_http_request_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of user lookups answered from the cache"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of user lookups that missed the cache"
    );
    describe_histogram!(
        names::CACHE_OPERATION_DURATION_SECONDS,
        "Cache store call duration in seconds"
    );
    describe_counter!(
        names::USER_OPERATIONS_TOTAL,
        "Total number of user operations by outcome"
    );
    describe_counter!(
        names::HTTP_REQUESTS_TOTAL,
        "Total number of HTTP requests by method, route and status"
    );
    describe_histogram!(
        names::HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds"
    );
}

/// Fire-and-forget metrics recording.
pub trait MetricsSink: Send + Sync {
    /// Counts a lookup answered from the cache.
    fn increment_cache_hit(&self);

    /// Counts a lookup that missed the cache.
    fn increment_cache_miss(&self);

    /// Records the latency of one cache store call (`get`, `set` or `delete`).
    fn record_cache_operation_duration(&self, operation: &'static str, duration: Duration);

    /// Counts a business operation and whether it succeeded.
    fn record_user_operation(&self, operation: &'static str, success: bool);
}

/// Records through the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl MetricsSink for PrometheusMetrics {
    fn increment_cache_hit(&self) {
        counter!(names::CACHE_HITS_TOTAL).increment(1);
    }

    fn increment_cache_miss(&self) {
        counter!(names::CACHE_MISSES_TOTAL).increment(1);
    }

    fn record_cache_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!(names::CACHE_OPERATION_DURATION_SECONDS, "operation" => operation)
            .record(duration.as_secs_f64());
    }

    fn record_user_operation(&self, operation: &'static str, success: bool) {
        counter!(
            names::USER_OPERATIONS_TOTAL,
            "operation" => operation,
            "success" => if success { "true" } else { "false" }
        )
        .increment(1);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_cache_hit(&self) {}

    fn increment_cache_miss(&self) {}

    fn record_cache_operation_duration(&self, _operation: &'static str, _duration: Duration) {}

    fn record_user_operation(&self, _operation: &'static str, _success: bool) {}
}
