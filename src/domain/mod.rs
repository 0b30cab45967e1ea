//! Domain layer: record identity, the visitor record entity, and payload
//! validation.
//!
//! Nothing in here performs I/O. Storage lives in [`crate::persistence`]
//! and orchestration in [`crate::service`].

pub mod record_id;
pub mod validation;
pub mod visitor_record;

pub use record_id::RecordId;
pub use validation::ValidationError;
pub use visitor_record::{NewVisitorRecord, VisitorRecord};
