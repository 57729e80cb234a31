//! Service state management.

use std::sync::Arc;

use crate::pipeline::{PipelineConfig, ResolutionPipeline};
use crate::provider::ContentProvider;
use crate::{DEFAULT_LIMIT, DEFAULT_MAX_LIMIT};

/// Shared service state.
///
/// Holds the resolution pipeline and request limits. Nothing in here is
/// mutated after startup.
pub struct ServiceState<P: ContentProvider + 'static> {
    /// Pipeline used by every request.
    pub pipeline: ResolutionPipeline<P>,
    /// Upper clamp for the requested result size.
    pub max_limit: u32,
}

impl<P: ContentProvider + 'static> ServiceState<P> {
    /// Create service state over a provider.
    pub fn new(provider: P, config: PipelineConfig) -> Self {
        Self {
            pipeline: ResolutionPipeline::new(Arc::new(provider), config),
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// Override the result-size clamp.
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit.max(1);
        self
    }

    /// Create service state from environment variables.
    ///
    /// Reads the pipeline settings and `RESOLVER_MAX_LIMIT`.
    pub fn from_env(provider: P) -> Self {
        let max_limit = std::env::var("RESOLVER_MAX_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_LIMIT);

        Self::new(provider, PipelineConfig::from_env()).with_max_limit(max_limit)
    }

    /// Apply the default and clamp to a requested limit.
    ///
    /// A missing or zero limit means the default.
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => DEFAULT_LIMIT.min(self.max_limit),
            Some(limit) => limit.min(self.max_limit),
        }
    }
}

impl<P: ContentProvider + 'static> Clone for ServiceState<P> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            max_limit: self.max_limit,
        }
    }
}
