//! Field-level validation and coercion for incoming visitor records.
//!
//! Payload fields arrive as loosely typed JSON (browsers send coordinates
//! both as numbers and as strings). Each helper here turns one field into
//! its typed form or a [`ValidationError`]. Validation never touches
//! storage.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Maximum accepted length of a visitor name, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Earliest year PostgreSQL `timestamptz` can hold (4713 BC). chrono's
/// upper bound is already below the backend's.
const MIN_STORABLE_YEAR: i32 = -4712;

/// Naive timestamp layouts accepted for `visit_time`, interpreted as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Rejection reasons for a record payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `name` was absent or `null`.
    #[error("name is required and must be a non-empty string")]
    MissingName,

    /// `name` was present but not a JSON string.
    #[error("name must be a string")]
    NameNotText,

    /// `name` was empty or whitespace only.
    #[error("name must not be empty or whitespace only")]
    EmptyName,

    /// `name` exceeded [`MAX_NAME_CHARS`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed characters.
        max: usize,
    },

    /// A text field contained a NUL character, which the backend cannot store.
    #[error("{field} must not contain NUL characters")]
    NulCharacter {
        /// Offending field name.
        field: &'static str,
    },

    /// `device` was neither text nor a structured JSON label.
    #[error("device must be a string or a JSON object")]
    DeviceNotText,

    /// A coordinate could not be read as a finite number.
    #[error("{field} must be numeric, got {value}")]
    InvalidCoordinate {
        /// Offending field name.
        field: &'static str,
        /// The rejected value as received.
        value: String,
    },
}

/// Validates and trims the visitor name.
///
/// # Errors
///
/// Returns [`ValidationError`] when the name is missing, not a string,
/// blank after trimming, too long, or contains a NUL character.
pub fn parse_name(value: Option<&Value>) -> Result<String, ValidationError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(ValidationError::MissingName),
        Some(Value::String(s)) => s,
        Some(_) => return Err(ValidationError::NameNotText),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.contains('\0') {
        return Err(ValidationError::NulCharacter { field: "name" });
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_CHARS,
        });
    }
    Ok(trimmed.to_string())
}

/// Reads the optional device descriptor.
///
/// Strings are trimmed (blank means absent). Objects and arrays are kept
/// as compact JSON text.
///
/// # Errors
///
/// Returns [`ValidationError::DeviceNotText`] for numbers and booleans,
/// and [`ValidationError::NulCharacter`] for text containing `\0`.
pub fn parse_device(value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.contains('\0') {
                return Err(ValidationError::NulCharacter { field: "device" });
            }
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(structured @ (Value::Object(_) | Value::Array(_))) => Ok(Some(structured.to_string())),
        Some(_) => Err(ValidationError::DeviceNotText),
    }
}

/// Coerces an optional coordinate to `f64`.
///
/// Accepts JSON numbers and numeric strings. No range check is applied.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCoordinate`] for non-numeric strings,
/// non-finite values and any other JSON type.
pub fn parse_coordinate(
    field: &'static str,
    value: Option<&Value>,
) -> Result<Option<f64>, ValidationError> {
    let invalid = |v: &Value| ValidationError::InvalidCoordinate {
        field,
        value: v.to_string(),
    };

    let parsed = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(v @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(v))?,
        Some(v @ Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<f64>().map_err(|_| invalid(v))?
        }
        Some(v) => return Err(invalid(v)),
    };

    if parsed.is_finite() {
        Ok(Some(parsed))
    } else {
        Err(ValidationError::InvalidCoordinate {
            field,
            value: parsed.to_string(),
        })
    }
}

/// Resolves the visit timestamp, defaulting to `now` when the field is
/// absent or cannot be understood.
///
/// Accepted inputs: RFC 3339, RFC 2822, naive date-times (UTC), plain
/// dates (midnight UTC) and epoch milliseconds. Instants before
/// 4713 BC cannot be stored and count as not understood.
#[must_use]
pub fn parse_visit_time(value: Option<&Value>, now: DateTime<Utc>) -> DateTime<Utc> {
    let parsed = match value {
        None | Some(Value::Null) => return now,
        Some(Value::String(s)) if s.trim().is_empty() => return now,
        Some(Value::String(s)) => parse_timestamp(s.trim()),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Some(_) => None,
    };

    parsed
        .filter(|t| t.year() >= MIN_STORABLE_YEAR)
        .unwrap_or_else(|| {
            tracing::warn!(value = ?value, "unparseable visit_time, using server time");
            now
        })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn name_is_trimmed() {
        let v = json!("  Ada Lovelace ");
        assert_eq!(parse_name(Some(&v)), Ok("Ada Lovelace".to_string()));
    }

    #[test]
    fn name_missing_or_null_is_rejected() {
        assert_eq!(parse_name(None), Err(ValidationError::MissingName));
        assert_eq!(
            parse_name(Some(&Value::Null)),
            Err(ValidationError::MissingName)
        );
    }

    #[test]
    fn whitespace_name_is_rejected() {
        let v = json!("   ");
        assert_eq!(parse_name(Some(&v)), Err(ValidationError::EmptyName));
    }

    #[test]
    fn non_string_name_is_rejected() {
        let v = json!(42);
        assert_eq!(parse_name(Some(&v)), Err(ValidationError::NameNotText));
    }

    #[test]
    fn overlong_name_is_rejected() {
        let v = Value::String("x".repeat(MAX_NAME_CHARS + 1));
        assert_eq!(
            parse_name(Some(&v)),
            Err(ValidationError::NameTooLong {
                max: MAX_NAME_CHARS
            })
        );
        let ok = Value::String("é".repeat(MAX_NAME_CHARS));
        assert!(parse_name(Some(&ok)).is_ok());
    }

    #[test]
    fn device_accepts_text_and_structured_labels() {
        assert_eq!(parse_device(None), Ok(None));
        assert_eq!(parse_device(Some(&json!("  "))), Ok(None));
        assert_eq!(
            parse_device(Some(&json!(" Mozilla/5.0 "))),
            Ok(Some("Mozilla/5.0".to_string()))
        );
        assert_eq!(
            parse_device(Some(&json!({"type": "mobile"}))),
            Ok(Some(r#"{"type":"mobile"}"#.to_string()))
        );
        assert_eq!(
            parse_device(Some(&json!(true))),
            Err(ValidationError::DeviceNotText)
        );
    }

    #[test]
    fn coordinates_accept_numbers_and_numeric_strings() {
        assert_eq!(
            parse_coordinate("latitude", Some(&json!(12.5))),
            Ok(Some(12.5))
        );
        assert_eq!(
            parse_coordinate("latitude", Some(&json!(" -33.25 "))),
            Ok(Some(-33.25))
        );
        assert_eq!(parse_coordinate("latitude", Some(&json!(""))), Ok(None));
        assert_eq!(parse_coordinate("latitude", None), Ok(None));
        assert_eq!(parse_coordinate("latitude", Some(&json!(0))), Ok(Some(0.0)));
    }

    #[test]
    fn coordinates_are_not_range_checked() {
        assert_eq!(
            parse_coordinate("latitude", Some(&json!(500.0))),
            Ok(Some(500.0))
        );
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        for bad in [json!("north"), json!("12abc"), json!("NaN"), json!(true), json!([1])] {
            let result = parse_coordinate("longitude", Some(&bad));
            let Err(ValidationError::InvalidCoordinate { field, .. }) = result else {
                panic!("expected rejection for {bad}");
            };
            assert_eq!(field, "longitude");
        }
    }

    #[test]
    fn visit_time_defaults_to_now() {
        let now = Utc::now();
        assert_eq!(parse_visit_time(None, now), now);
        assert_eq!(parse_visit_time(Some(&Value::Null), now), now);
        assert_eq!(parse_visit_time(Some(&json!("not a date")), now), now);
        assert_eq!(parse_visit_time(Some(&json!({"a": 1})), now), now);
    }

    #[test]
    fn visit_time_parses_supported_layouts() {
        let now = Utc::now();
        let Some(expected) = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single() else {
            panic!("valid date");
        };
        for input in [
            json!("2024-03-01T12:30:00Z"),
            json!("2024-03-01T14:30:00+02:00"),
            json!("2024-03-01T12:30:00"),
            json!("2024-03-01 12:30:00.000"),
            json!("Fri, 01 Mar 2024 12:30:00 +0000"),
            json!(expected.timestamp_millis()),
        ] {
            assert_eq!(parse_visit_time(Some(&input), now), expected, "{input}");
        }
    }

    #[test]
    fn nul_characters_are_rejected() {
        assert_eq!(
            parse_name(Some(&json!("Ada\0"))),
            Err(ValidationError::NulCharacter { field: "name" })
        );
        assert_eq!(
            parse_device(Some(&json!("Mozilla\0/5.0"))),
            Err(ValidationError::NulCharacter { field: "device" })
        );
        // Serialized structured labels escape NUL, so they stay storable.
        let Ok(Some(label)) = parse_device(Some(&json!({"ua": "a\0b"}))) else {
            panic!("structured device should be accepted");
        };
        assert!(!label.contains('\0'));
    }

    #[test]
    fn visit_time_before_storable_range_defaults_to_now() {
        let now = Utc::now();
        assert_eq!(parse_visit_time(Some(&json!("-5000-01-01")), now), now);
        assert_eq!(
            parse_visit_time(Some(&json!(-300_000_000_000_000_i64)), now),
            now
        );
        let Some(earliest) = Utc.with_ymd_and_hms(-4712, 1, 1, 0, 0, 0).single() else {
            panic!("valid date");
        };
        assert_eq!(
            parse_visit_time(Some(&json!(earliest.timestamp_millis())), now),
            earliest
        );
    }

    #[test]
    fn visit_time_accepts_plain_date() {
        let now = Utc::now();
        let Some(expected) = Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).single() else {
            panic!("valid date");
        };
        assert_eq!(parse_visit_time(Some(&json!("2023-12-24")), now), expected);
    }
}
