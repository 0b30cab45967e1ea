//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::Environment;
use crate::error::ApiError;
use crate::service::RecordService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Record service for all business logic.
    pub record_service: Arc<RecordService>,
    /// Deployment environment, used to gate error diagnostics.
    pub environment: Environment,
}

impl AppState {
    /// Creates the state for the given service and environment.
    #[must_use]
    pub fn new(record_service: Arc<RecordService>, environment: Environment) -> Self {
        Self {
            record_service,
            environment,
        }
    }

    /// Prepares an error for the client: server-side failures are logged
    /// with their full diagnostics, then details are stripped unless the
    /// environment allows them.
    #[must_use]
    pub fn reject(&self, err: ApiError) -> ApiError {
        if err.status_code().is_server_error() {
            tracing::error!(
                kind = err.kind(),
                message = %err.message(),
                details = err.details().unwrap_or_default(),
                "request failed"
            );
        }
        err.redact(self.environment.exposes_error_details())
    }
}
