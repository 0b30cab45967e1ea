//! Visitor record entity and its validated insert payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RecordId;

/// One persisted entry describing a site visit.
///
/// Immutable once stored: there is no update or delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VisitorRecord {
    /// Backend-assigned identifier.
    pub id: RecordId,
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Free-text device descriptor.
    pub device: Option<String>,
    /// Latitude in decimal degrees (not range-checked).
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees (not range-checked).
    pub longitude: Option<f64>,
    /// When the visit happened, as reported by the client or defaulted
    /// to the server clock.
    pub visit_time: DateTime<Utc>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
}

/// A validated record ready to be inserted.
///
/// Only constructed through [`super::validation`], so `name` is always
/// trimmed and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVisitorRecord {
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Device descriptor, `None` when absent or blank.
    pub device: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Visit timestamp.
    pub visit_time: DateTime<Utc>,
}
