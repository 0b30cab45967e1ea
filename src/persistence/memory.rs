//! In-process record store.
//!
//! Mirrors the PostgreSQL semantics closely enough for handler and client
//! tests: the table starts unprovisioned, ids increase monotonically, and
//! listings use the same `(visit_time DESC, id DESC)` ordering.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::models::ProbeReport;
use super::{RecordStore, StoreError};
use crate::domain::{NewVisitorRecord, RecordId, VisitorRecord};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<VisitorRecord>,
    last_id: i64,
}

/// Record store that keeps rows in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Option<Table>>,
    unreachable: bool,
}

impl MemoryStore {
    /// Creates an empty, unprovisioned store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose every operation fails with
    /// [`StoreError::Connection`].
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            table: Mutex::new(None),
            unreachable: true,
        }
    }

    /// Number of stored rows (zero when unprovisioned).
    pub async fn len(&self) -> usize {
        self.table.lock().await.as_ref().map_or(0, |t| t.rows.len())
    }

    /// Returns `true` if no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable {
            return Err(StoreError::Connection(
                "connection refused (in-memory store marked unreachable)".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn provision(&self) -> Result<(), StoreError> {
        self.check_reachable()?;
        self.table.lock().await.get_or_insert_with(Table::default);
        Ok(())
    }

    async fn insert(&self, record: &NewVisitorRecord) -> Result<VisitorRecord, StoreError> {
        self.check_reachable()?;
        let mut guard = self.table.lock().await;
        let table = guard.as_mut().ok_or(StoreError::NotProvisioned)?;

        table.last_id = table.last_id.saturating_add(1);
        let stored = VisitorRecord {
            id: RecordId::new(table.last_id),
            name: record.name.clone(),
            device: record.device.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            visit_time: record.visit_time,
            created_at: Utc::now(),
        };
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<VisitorRecord>, StoreError> {
        self.check_reachable()?;
        let guard = self.table.lock().await;
        let table = guard.as_ref().ok_or(StoreError::NotProvisioned)?;

        let mut rows = table.rows.clone();
        rows.sort_by_key(|r| (Reverse(r.visit_time), Reverse(r.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn probe(&self) -> ProbeReport {
        match self.check_reachable() {
            Ok(()) => ProbeReport::connected(
                format!("in-memory store ({})", env!("CARGO_PKG_VERSION")),
                "memory".to_string(),
                "memory".to_string(),
            ),
            Err(e) => ProbeReport::failed(e.to_string(), format!("{e:?}")),
        }
    }
}
