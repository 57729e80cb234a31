//! Axum routes for the resolver service.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::error::FailureKind;
use crate::provider::{ContentProvider, GraphApiProvider};
use crate::types::{CredentialContext, NormalizedMediaItem, StrategyKind};

use super::middleware::{metrics_middleware, record_resolution_metrics};
use super::state::ServiceState;

/// Type alias for the service state with the Graph API provider.
pub type AppState = ServiceState<GraphApiProvider>;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to fetch a creator's reels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReelsRequest {
    /// Caller's access token (required).
    #[serde(default)]
    pub access_token: Option<String>,
    /// Caller-claimed user id (required).
    #[serde(default)]
    pub user_id: Option<String>,
    /// Result-size limit (default: 10).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Successful reels response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelsResponse {
    pub success: bool,
    pub data: Vec<NormalizedMediaItem>,
    pub message: String,
}

/// Error body shared by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Service health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Strategy order used by the pipeline.
    pub strategies: Vec<StrategyKind>,
    pub call_timeout_ms: u64,
    pub concurrent_page_lookups: bool,
    pub max_limit: u32,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    pub status: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(code: &str, error: impl Into<String>) -> ApiError {
    let body = ErrorResponse::new(code, error);
    tracing::warn!(code = %body.code, error = %body.error, "Rejected request");
    (StatusCode::BAD_REQUEST, Json(body))
}

/// HTTP status and error code for a resolution failure.
fn failure_status(failure: Option<FailureKind>) -> (StatusCode, &'static str) {
    match failure {
        Some(FailureKind::NoLinkedAccount) => (StatusCode::NOT_FOUND, "NO_LINKED_ACCOUNT"),
        Some(FailureKind::CredentialInvalid) => (StatusCode::INTERNAL_SERVER_ERROR, "CREDENTIAL_INVALID"),
        Some(FailureKind::Cancelled) => (StatusCode::INTERNAL_SERVER_ERROR, "CANCELLED"),
        Some(FailureKind::UpstreamUnavailable) | None => {
            (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_UNAVAILABLE")
        }
    }
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Resolve the caller's content account and return its reels.
async fn reels_handler<P: ContentProvider + 'static>(
    State(state): State<Arc<ServiceState<P>>>,
    payload: Result<Json<ReelsRequest>, JsonRejection>,
) -> Result<Json<ReelsResponse>, ApiError> {
    let started = Instant::now();

    let Json(request) = payload.map_err(|e| bad_request("INVALID_BODY", e.body_text()))?;

    let access_token = required(request.access_token)
        .ok_or_else(|| bad_request("MISSING_FIELD", "accessToken is required"))?;
    let user_id = required(request.user_id)
        .ok_or_else(|| bad_request("MISSING_FIELD", "userId is required"))?;
    let limit = state.effective_limit(request.limit);

    let ctx = CredentialContext::new(access_token, user_id, limit)
        .map_err(|e| bad_request("INVALID_CREDENTIAL", e.to_string()))?;

    let outcome = state.pipeline.resolve(&ctx).await;

    record_resolution_metrics(
        outcome.strategy_used,
        outcome.success,
        outcome.items.len(),
        outcome.skipped_records,
        started.elapsed().as_millis() as u64,
    );

    if outcome.success {
        let via = outcome
            .strategy_used
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let message = format!("Fetched {} reels via {} access", outcome.items.len(), via);
        return Ok(Json(ReelsResponse {
            success: true,
            data: outcome.items,
            message,
        }));
    }

    let (status, code) = failure_status(outcome.failure);
    let error = outcome
        .diagnostic
        .unwrap_or_else(|| "content account could not be resolved".to_string());
    Err((status, Json(ErrorResponse::new(code, error))))
}

/// Health check endpoint (detailed).
async fn health_handler<P: ContentProvider + 'static>(
    State(state): State<Arc<ServiceState<P>>>,
) -> Json<HealthResponse> {
    let config = state.pipeline.config();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        strategies: StrategyKind::ORDER.to_vec(),
        call_timeout_ms: config.call_timeout.as_millis() as u64,
        concurrent_page_lookups: config.concurrent_page_lookups,
        max_limit: state.max_limit,
    })
}

/// Liveness probe endpoint.
///
/// Does NOT check upstream reachability.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the resolver service.
pub fn create_router<P: ContentProvider + 'static>(state: ServiceState<P>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/media/reels", post(reels_handler::<P>))
        .route("/health", get(health_handler::<P>))
        .route("/health/live", get(liveness_handler))
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state)
}
