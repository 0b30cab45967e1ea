//! Record service: validation has already happened; this layer provisions,
//! persists, lists, and probes.

use std::sync::Arc;

use crate::domain::{NewVisitorRecord, VisitorRecord};
use crate::error::ApiError;
use crate::persistence::{ProbeReport, RecordStore, StoreError};

/// Fixed page size for listings.
pub const MAX_LISTED_RECORDS: u32 = 100;

/// Result of a listing call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordListing {
    /// Most recent visits first.
    pub records: Vec<VisitorRecord>,
    /// `false` when the table has not been created yet.
    pub provisioned: bool,
}

/// Orchestration layer for visitor records.
///
/// Holds no records itself. Every call goes to the store exactly once per
/// step, with no retry.
#[derive(Debug, Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    /// Creates a new `RecordService` on top of the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Returns a reference to the inner store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Provisions the table, then inserts the record.
    ///
    /// The two steps are separate round trips. Once provisioning has
    /// succeeded, any insert failure is reported as a persistence error.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`], [`ApiError::Connection`] or
    /// [`ApiError::Persistence`] depending on where storage failed.
    pub async fn create(&self, record: NewVisitorRecord) -> Result<VisitorRecord, ApiError> {
        self.store.provision().await?;

        let stored = self
            .store
            .insert(&record)
            .await
            .map_err(ApiError::insert_failed)?;

        tracing::info!(record_id = %stored.id, name = %stored.name, "visitor record saved");
        Ok(stored)
    }

    /// Lists up to [`MAX_LISTED_RECORDS`] records, newest visit first.
    ///
    /// A missing table yields an empty, unprovisioned listing.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for any other storage failure.
    pub async fn list(&self) -> Result<RecordListing, ApiError> {
        match self.store.list_recent(MAX_LISTED_RECORDS).await {
            Ok(records) => Ok(RecordListing {
                records,
                provisioned: true,
            }),
            Err(StoreError::NotProvisioned) => {
                tracing::debug!("visitor_records table not provisioned yet");
                Ok(RecordListing {
                    records: Vec::new(),
                    provisioned: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Runs the backend connectivity probe.
    pub async fn probe(&self) -> ProbeReport {
        self.store.probe().await
    }
}
