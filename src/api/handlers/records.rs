//! Visitor record handlers: create and list.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{CreateRecordRequest, CreateRecordResponse, RecordListResponse};
use crate::app_state::AppState;
use crate::error::{ApiError, ErrorResponse};

/// Hint returned by the listing while the table has not been created.
pub const NOT_PROVISIONED_HINT: &str = "No visitor records yet. Save a visitor first!";

/// Confirmation message for a successful save.
pub const SAVED_MESSAGE: &str = "Visitor record saved successfully";

/// `POST /records` — Validate and persist a visitor record.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] for malformed bodies or invalid fields,
/// and a server-side [`ApiError`] when storage fails.
#[utoipa::path(
    post,
    path = "/records",
    tag = "Records",
    summary = "Save a visitor record",
    description = "Validates the payload, provisions the table if needed, and inserts one record.",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Record saved", body = CreateRecordResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 500, description = "Configuration, connection, or persistence failure", body = ErrorResponse),
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        ApiError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
    })?;

    let record = req.validate(Utc::now())?;

    let stored = state
        .record_service
        .create(record)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(CreateRecordResponse {
        success: true,
        message: SAVED_MESSAGE.to_string(),
        record: stored,
    }))
}

/// `GET /records` — List the most recent visitor records.
///
/// # Errors
///
/// Returns a server-side [`ApiError`] when storage fails. A missing table
/// is not an error.
#[utoipa::path(
    get,
    path = "/records",
    tag = "Records",
    summary = "List visitor records",
    description = "Returns up to 100 records ordered by visit time (newest first), ties broken by id.",
    responses(
        (status = 200, description = "Record listing", body = RecordListResponse),
        (status = 500, description = "Configuration, connection, or persistence failure", body = ErrorResponse),
    )
)]
pub async fn list_records(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let listing = state
        .record_service
        .list()
        .await
        .map_err(|e| state.reject(e))?;

    let message = (!listing.provisioned).then(|| NOT_PROVISIONED_HINT.to_string());

    Ok(Json(RecordListResponse {
        success: true,
        count: listing.records.len(),
        records: listing.records,
        message,
    }))
}

/// `OPTIONS` — CORS preflight that reached the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn records_method_not_allowed() -> impl IntoResponse {
    (
        [(header::ALLOW, "GET, POST, OPTIONS")],
        ApiError::MethodNotAllowed {
            allowed: "GET, POST",
        },
    )
}

/// Record routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/records",
        get(list_records)
            .post(create_record)
            .options(preflight)
            .fallback(records_method_not_allowed),
    )
}
