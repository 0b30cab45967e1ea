//! System endpoints: backend connectivity probe.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::records::preflight;
use crate::api::dto::HealthResponse;
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

const UNKNOWN: &str = "Unknown";

/// `GET /health` — Backend connectivity probe.
///
/// # Errors
///
/// Returns [`ApiError::Connection`] (HTTP 500) when the probe fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Database connectivity probe",
    description = "Runs an introspection query against the backend and reports its version, database, and user.",
    responses(
        (status = 200, description = "Backend reachable", body = HealthResponse),
        (status = 500, description = "Backend unreachable or unconfigured", body = ErrorResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let report = state.record_service.probe().await;

    if !report.success {
        let details = match (report.error, report.details) {
            (Some(error), Some(details)) => Some(format!("{error} ({details})")),
            (error, details) => error.or(details),
        };
        return Err(state.reject(ApiError::Connection { details }));
    }

    Ok(Json(HealthResponse {
        success: true,
        status: "connected".to_string(),
        version: report.version.unwrap_or_else(|| UNKNOWN.to_string()),
        database: report.database.unwrap_or_else(|| UNKNOWN.to_string()),
        user: report.user.unwrap_or_else(|| UNKNOWN.to_string()),
        message: "Successfully connected to the database".to_string(),
    }))
}

async fn health_method_not_allowed() -> impl IntoResponse {
    (
        [(header::ALLOW, "GET, OPTIONS")],
        ApiError::MethodNotAllowed { allowed: "GET" },
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/health",
        get(health_handler)
            .options(preflight)
            .fallback(health_method_not_allowed),
    )
}
