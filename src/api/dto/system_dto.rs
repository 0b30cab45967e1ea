//! Connectivity probe DTO.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for a successful `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `true`.
    pub success: bool,
    /// Always `"connected"`.
    pub status: String,
    /// Backend version string.
    pub version: String,
    /// Current database name.
    pub database: String,
    /// Current database principal.
    pub user: String,
    /// Confirmation message.
    pub message: String,
}
