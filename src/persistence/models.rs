//! Database models for visitor rows and connectivity probes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{RecordId, VisitorRecord};

/// Column tuple as returned by `SELECT`/`RETURNING` on `visitor_records`.
pub(crate) type VisitorRow = (
    i64,
    String,
    Option<String>,
    Option<f64>,
    Option<f64>,
    DateTime<Utc>,
    DateTime<Utc>,
);

/// Converts a raw row into the domain entity.
pub(crate) fn record_from_row(row: VisitorRow) -> VisitorRecord {
    let (id, name, device, latitude, longitude, visit_time, created_at) = row;
    VisitorRecord {
        id: RecordId::new(id),
        name,
        device,
        latitude,
        longitude,
        visit_time,
        created_at,
    }
}

/// Result of a connectivity probe against the backend.
///
/// Callers check [`ProbeReport::success`]; a failed probe is a value, not
/// an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Whether the introspection query succeeded.
    pub success: bool,
    /// Backend version string.
    pub version: Option<String>,
    /// Current database name.
    pub database: Option<String>,
    /// Current database principal.
    pub user: Option<String>,
    /// Short error text on failure.
    pub error: Option<String>,
    /// Full diagnostic text on failure.
    pub details: Option<String>,
}

impl ProbeReport {
    /// Builds a successful report.
    #[must_use]
    pub fn connected(version: String, database: String, user: String) -> Self {
        Self {
            success: true,
            version: Some(version),
            database: Some(database),
            user: Some(user),
            error: None,
            details: None,
        }
    }

    /// Builds a failed report with the captured error text.
    #[must_use]
    pub fn failed(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            version: None,
            database: None,
            user: None,
            error: Some(error.into()),
            details: Some(details.into()),
        }
    }
}
