//! Service layer: business logic orchestration.
//!
//! [`RecordService`] provisions storage, persists validated records and
//! serves listings through a [`crate::persistence::RecordStore`].

pub mod record_service;

pub use record_service::{MAX_LISTED_RECORDS, RecordListing, RecordService};
