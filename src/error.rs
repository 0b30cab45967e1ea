//! Service error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type for the HTTP layer. Each variant
//! maps to a stable `error` kind string, an HTTP status code, and a
//! structured JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ValidationError;
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": "validation_error",
///   "message": "name must not be empty or whitespace only",
///   "details": null
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Stable error classification (see [`ApiError::kind`]).
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Backend diagnostic text, only outside production.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// | Kind                  | HTTP Status |
/// |-----------------------|-------------|
/// | `validation_error`    | 400         |
/// | `method_not_allowed`  | 405         |
/// | `configuration_error` | 500         |
/// | `connection_error`    | 500         |
/// | `persistence_error`   | 500         |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client input was rejected before reaching storage.
    #[error("{0}")]
    Validation(String),

    /// HTTP method not supported on this path.
    #[error("only {allowed} requests are allowed")]
    MethodNotAllowed {
        /// Comma-separated list of accepted methods.
        allowed: &'static str,
    },

    /// Connection string missing or invalid.
    #[error("database configuration error")]
    Configuration {
        /// Human-readable explanation.
        message: String,
        /// Diagnostic text.
        details: Option<String>,
    },

    /// Backend unreachable.
    #[error("database connection failed")]
    Connection {
        /// Diagnostic text.
        details: Option<String>,
    },

    /// Operation executed but produced an error or inconsistent result.
    #[error("{message}")]
    Persistence {
        /// Human-readable explanation.
        message: String,
        /// Diagnostic text.
        details: Option<String>,
    },
}

impl ApiError {
    /// Returns the stable classification string for this variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Configuration { .. } => "configuration_error",
            Self::Connection { .. } => "connection_error",
            Self::Persistence { .. } => "persistence_error",
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Configuration { .. } | Self::Connection { .. } | Self::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Human-readable message returned to clients.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Configuration { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns the diagnostic text, if any.
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Configuration { details, .. }
            | Self::Connection { details }
            | Self::Persistence { details, .. } => details.as_deref(),
            Self::Validation(_) | Self::MethodNotAllowed { .. } => None,
        }
    }

    /// Maps a failure of the insert step to a persistence error,
    /// whatever its underlying kind.
    #[must_use]
    pub fn insert_failed(err: StoreError) -> Self {
        Self::Persistence {
            message: "failed to save visitor record".to_string(),
            details: Some(err.to_string()),
        }
    }

    /// Strips diagnostic details unless `expose` is set.
    #[must_use]
    pub fn redact(mut self, expose: bool) -> Self {
        if !expose {
            match &mut self {
                Self::Configuration { details, .. }
                | Self::Connection { details }
                | Self::Persistence { details, .. } => *details = None,
                Self::Validation(_) | Self::MethodNotAllowed { .. } => {}
            }
        }
        self
    }

    /// Builds the JSON body for this error.
    #[must_use]
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.kind().to_string(),
            message: self.message(),
            details: self.details().map(str::to_string),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Configuration(reason) => Self::Configuration {
                message: reason,
                details: None,
            },
            StoreError::Connection(reason) => Self::Connection {
                details: Some(reason),
            },
            StoreError::NotProvisioned => Self::Persistence {
                message: "visitor records table is missing".to_string(),
                details: Some(StoreError::NotProvisioned.to_string()),
            },
            StoreError::Persistence(reason) => Self::Persistence {
                message: "database operation failed".to_string(),
                details: Some(reason),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(kind = self.kind(), %status, "responding with error");
        let mut response = axum::Json(self.to_body()).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let err = ApiError::from(ValidationError::EmptyName);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(err.message(), "name must not be empty or whitespace only");
    }

    #[test]
    fn store_errors_map_to_500_kinds() {
        let cases = [
            (
                StoreError::Configuration("DATABASE_URL missing".into()),
                "configuration_error",
            ),
            (StoreError::Connection("refused".into()), "connection_error"),
            (StoreError::Persistence("boom".into()), "persistence_error"),
            (StoreError::NotProvisioned, "persistence_error"),
        ];
        for (store_err, kind) in cases {
            let err = ApiError::from(store_err);
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn backend_text_only_travels_in_details() {
        let err = ApiError::from(StoreError::Persistence("syntax error at or near".into()));
        let body = err.to_body();
        assert!(!body.message.contains("syntax"));
        assert_eq!(body.details.as_deref(), Some("syntax error at or near"));
    }

    #[test]
    fn redact_strips_details() {
        let err = ApiError::from(StoreError::Connection("refused".into())).redact(false);
        assert!(err.details().is_none());

        let kept = ApiError::from(StoreError::Connection("refused".into())).redact(true);
        assert_eq!(kept.details(), Some("refused"));
    }

    #[test]
    fn insert_failures_are_persistence_errors() {
        let err = ApiError::insert_failed(StoreError::Connection("reset by peer".into()));
        assert_eq!(err.kind(), "persistence_error");
    }

    #[test]
    fn method_not_allowed_is_405() {
        let err = ApiError::MethodNotAllowed {
            allowed: "GET, POST",
        };
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.message(), "only GET, POST requests are allowed");
    }
}
