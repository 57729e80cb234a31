//! Service middleware for metrics and request tracking.
//!
//! ## Metrics Exposed
//!
//! - `request` - Request count by route, method, status, with latency
//! - `resolution` - Strategy used, item counts and latency per resolution
//!
//! Metrics are tracing events under the `feed_resolver::metrics` target,
//! aggregated downstream from logs.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::info;

use crate::types::StrategyKind;

/// Metrics middleware that records request counts and latency.
///
/// Uses the matched route template rather than the raw path to keep
/// cardinality bounded.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "feed_resolver::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Record the result of one resolution.
pub fn record_resolution_metrics(
    strategy: Option<StrategyKind>,
    success: bool,
    item_count: usize,
    skipped_records: usize,
    latency_ms: u64,
) {
    let strategy = strategy.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string());
    let result = if success { "resolved" } else { "failed" };
    info!(
        target: "feed_resolver::metrics",
        metric_type = "resolution",
        strategy = %strategy,
        result = result,
        item_count = item_count,
        skipped_records = skipped_records,
        latency_ms = latency_ms,
        "resolution_metric"
    );
}
