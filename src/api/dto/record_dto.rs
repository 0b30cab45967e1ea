//! Visitor record DTOs for create and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::validation::{parse_coordinate, parse_device, parse_name, parse_visit_time};
use crate::domain::{NewVisitorRecord, ValidationError, VisitorRecord};

/// Request body for `POST /records`.
///
/// Fields are kept as raw JSON so that browsers may send coordinates as
/// numbers or strings; [`CreateRecordRequest::validate`] does the coercion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
    /// Visitor display name (required, non-empty after trimming).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String)]
    pub name: Option<Value>,
    /// Device descriptor: a string or a structured JSON label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub device: Option<Value>,
    /// Latitude as a number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Value>,
    /// Longitude as a number or numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Value>,
    /// Visit timestamp (RFC 3339 preferred); defaults to server time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub visit_time: Option<Value>,
}

impl CreateRecordRequest {
    /// Validates and coerces the payload.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered, checking `name`
    /// first.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<NewVisitorRecord, ValidationError> {
        Ok(NewVisitorRecord {
            name: parse_name(self.name.as_ref())?,
            device: parse_device(self.device.as_ref())?,
            latitude: parse_coordinate("latitude", self.latitude.as_ref())?,
            longitude: parse_coordinate("longitude", self.longitude.as_ref())?,
            visit_time: parse_visit_time(self.visit_time.as_ref(), now),
        })
    }
}

/// Response body for `POST /records`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
    /// The stored record, including its assigned id.
    pub record: VisitorRecord,
}

/// Response body for `GET /records`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    /// Always `true`.
    pub success: bool,
    /// Number of records returned.
    pub count: usize,
    /// Records, most recent visit first.
    pub records: Vec<VisitorRecord>,
    /// Hint shown when there is no data yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value) -> CreateRecordRequest {
        let Ok(req) = serde_json::from_value(body) else {
            panic!("request should deserialize");
        };
        req
    }

    #[test]
    fn full_payload_validates() {
        let req = parse(json!({
            "name": " Ada ",
            "device": "Mozilla/5.0",
            "latitude": "12.345678",
            "longitude": 98.765432,
            "visit_time": "2024-05-01T10:00:00Z"
        }));
        let Ok(record) = req.validate(Utc::now()) else {
            panic!("payload should validate");
        };
        assert_eq!(record.name, "Ada");
        assert!(record.latitude.is_some_and(|v| (v - 12.345678).abs() < 1e-9));
        assert!(record.longitude.is_some_and(|v| (v - 98.765432).abs() < 1e-9));
        assert_eq!(record.visit_time.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn empty_object_misses_name() {
        let req = parse(json!({}));
        assert_eq!(req.validate(Utc::now()), Err(ValidationError::MissingName));
    }

    #[test]
    fn bad_coordinate_is_reported() {
        let req = parse(json!({"name": "x", "latitude": "abc"}));
        assert!(matches!(
            req.validate(Utc::now()),
            Err(ValidationError::InvalidCoordinate {
                field: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn list_response_omits_absent_message() {
        let body = RecordListResponse {
            success: true,
            count: 0,
            records: Vec::new(),
            message: None,
        };
        let Ok(json) = serde_json::to_value(&body) else {
            panic!("serialization failed");
        };
        assert_eq!(json, json!({"success": true, "count": 0, "records": []}));
    }
}
