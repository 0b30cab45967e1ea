//! Request-scoped visitor attributes.
//!
//! Everything the browser used to keep in page-level variables (name,
//! device fingerprint, geolocation) travels in one [`VisitorContext`]
//! value passed to each call.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::api::dto::CreateRecordRequest;

/// Number of user-agent characters kept as the device label.
pub const DEVICE_LABEL_MAX_CHARS: usize = 50;

/// A geolocation fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Attributes collected for one visit.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorContext {
    /// Display name entered by the visitor.
    pub name: String,
    /// Device descriptor.
    pub device: Option<String>,
    /// Location, when the visitor granted it.
    pub location: Option<GeoPoint>,
    /// Visit time; the server uses its own clock when absent.
    pub visit_time: Option<DateTime<Utc>>,
}

impl VisitorContext {
    /// Creates a context with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device: None,
            location: None,
            visit_time: None,
        }
    }

    /// Sets the device descriptor.
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the visit time.
    #[must_use]
    pub fn with_visit_time(mut self, visit_time: DateTime<Utc>) -> Self {
        self.visit_time = Some(visit_time);
        self
    }

    /// Builds the `POST /records` body.
    #[must_use]
    pub fn to_request(&self) -> CreateRecordRequest {
        CreateRecordRequest {
            name: Some(Value::String(self.name.clone())),
            device: self.device.clone().map(Value::String),
            latitude: self.location.map(|p| Value::from(p.latitude)),
            longitude: self.location.map(|p| Value::from(p.longitude)),
            visit_time: self.visit_time.map(|t| Value::String(t.to_rfc3339())),
        }
    }
}

/// Derives a device label from a user-agent string.
#[must_use]
pub fn device_label(user_agent: &str) -> String {
    user_agent.trim().chars().take(DEVICE_LABEL_MAX_CHARS).collect()
}
