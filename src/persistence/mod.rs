//! Persistence layer: the `visitor_records` table.
//!
//! Provides the [`RecordStore`] trait for provisioning, inserting and
//! listing visitor records. [`postgres::PostgresStore`] is the production
//! implementation on top of `sqlx::PgPool`; [`memory::MemoryStore`] keeps
//! records in process for tests and database-less local runs.
//!
//! Backend failures are classified into [`StoreError`] by error kind and
//! SQLSTATE code, so callers branch on the variant rather than on message
//! text.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use models::ProbeReport;
pub use postgres::PostgresStore;

use crate::domain::{NewVisitorRecord, VisitorRecord};

/// SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

/// SQLSTATE for `invalid_catalog_name` (database does not exist).
const INVALID_CATALOG_NAME: &str = "3D000";

/// Typed storage failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection string missing or unusable.
    #[error("database configuration error: {0}")]
    Configuration(String),

    /// Backend unreachable or refused the session.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The `visitor_records` table does not exist yet.
    #[error("visitor_records table does not exist")]
    NotProvisioned,

    /// The statement ran but produced an error or an inconsistent result.
    #[error("database operation failed: {0}")]
    Persistence(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Configuration(_) => Self::Configuration(err.to_string()),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connection(err.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNDEFINED_TABLE) => Self::NotProvisioned,
                Some(code) if is_connection_sqlstate(code) => Self::Connection(err.to_string()),
                _ => Self::Persistence(err.to_string()),
            },
            _ => Self::Persistence(err.to_string()),
        }
    }
}

/// Class `08` is connection exception, class `28` invalid authorization.
fn is_connection_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("28") || code == INVALID_CATALOG_NAME
}

/// Storage backend for visitor records.
///
/// Implementations own record identity: ids are assigned on insert and
/// never reused. No implementation caches records across calls.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Ensures the records table exists. Safe to call on every request and
    /// from concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend is unconfigured,
    /// unreachable, or rejects the DDL.
    async fn provision(&self) -> Result<(), StoreError>;

    /// Inserts one record and returns it with its assigned id and
    /// `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotProvisioned`] if the table is missing and
    /// [`StoreError::Persistence`] if no row comes back.
    async fn insert(&self, record: &NewVisitorRecord) -> Result<VisitorRecord, StoreError>;

    /// Returns up to `limit` records ordered by `visit_time` descending,
    /// ties broken by `id` descending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotProvisioned`] if the table does not exist
    /// yet, or another [`StoreError`] on backend failure.
    async fn list_recent(&self, limit: u32) -> Result<Vec<VisitorRecord>, StoreError>;

    /// Runs a connectivity and introspection check. Never fails: problems
    /// are reported through [`ProbeReport::success`].
    async fn probe(&self) -> ProbeReport;
}
