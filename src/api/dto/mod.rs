//! Data Transfer Objects for REST request/response serialization.
//!
//! Success bodies carry `success: true`; error bodies are
//! [`crate::error::ErrorResponse`]. The ingestion client decodes the same
//! types.

pub mod record_dto;
pub mod system_dto;

pub use record_dto::*;
pub use system_dto::*;
