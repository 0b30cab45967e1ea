//! Type-safe visitor record identifier.
//!
//! [`RecordId`] is a newtype wrapper around the backend-assigned `BIGSERIAL`
//! value so that record identifiers cannot be confused with other integers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a stored [`super::VisitorRecord`].
///
/// Assigned by the storage backend at insertion time, strictly increasing
/// and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw backend identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&RecordId::new(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
    }

    #[test]
    fn deserializes_from_number() {
        let Ok(id) = serde_json::from_str::<RecordId>("7") else {
            panic!("deserialization failed");
        };
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(RecordId::new(1) < RecordId::new(2));
        assert_eq!(i64::from(RecordId::from(9)), 9);
    }

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(RecordId::new(15).to_string(), "15");
    }
}
