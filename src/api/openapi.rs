//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::api::dto::{CreateRecordRequest, CreateRecordResponse, HealthResponse, RecordListResponse};
use crate::api::handlers::{records, system};
use crate::domain::{RecordId, VisitorRecord};
use crate::error::ErrorResponse;

/// OpenAPI description of the record and system endpoints.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "visitor-gateway",
        description = "Ingestion and listing service for website visitor records"
    ),
    paths(
        records::create_record,
        records::list_records,
        system::health_handler,
    ),
    components(schemas(
        CreateRecordRequest,
        CreateRecordResponse,
        RecordListResponse,
        HealthResponse,
        VisitorRecord,
        RecordId,
        ErrorResponse,
    )),
    tags(
        (name = "Records", description = "Visitor record ingestion and listing"),
        (name = "System", description = "Connectivity probe"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/swagger-ui`, serving the document at
/// `/api-docs/openapi.json`.
#[cfg(feature = "swagger-ui")]
pub fn swagger_router<S>() -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
