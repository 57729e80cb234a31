//! Resolver REST Service
//!
//! Exposes the resolution pipeline over HTTP.
//!
//! ## Endpoints
//!
//! - `POST /api/media/reels` - Resolve the caller's content account and return its reels
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{metrics_middleware, record_resolution_metrics};
pub use routes::{create_router, AppState, ErrorResponse, ReelsRequest, ReelsResponse};
pub use state::ServiceState;
