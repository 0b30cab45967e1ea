//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::models::{ProbeReport, VisitorRow, record_from_row};
use super::{RecordStore, StoreError};
use crate::config::DatabaseConfig;
use crate::domain::{NewVisitorRecord, VisitorRecord};

/// Key for the transaction-scoped advisory lock taken while provisioning.
const PROVISION_LOCK_KEY: i64 = 0x7669_7369_746f_7273;

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS visitor_records ( \
     id BIGSERIAL PRIMARY KEY, \
     name VARCHAR(255) NOT NULL, \
     device TEXT, \
     latitude DOUBLE PRECISION, \
     longitude DOUBLE PRECISION, \
     visit_time TIMESTAMPTZ NOT NULL DEFAULT now(), \
     created_at TIMESTAMPTZ NOT NULL DEFAULT now())";

const CREATE_INDEX_SQL: &str = "CREATE INDEX IF NOT EXISTS visitor_records_visit_time_idx \
     ON visitor_records (visit_time DESC, id DESC)";

#[derive(Debug, Clone)]
enum Backend {
    Ready(PgPool),
    Unconfigured(String),
}

/// PostgreSQL-backed record store using a lazily connected `sqlx::PgPool`.
///
/// Construction never touches the network. A missing or malformed
/// connection string is remembered and reported as
/// [`StoreError::Configuration`] on first use.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    backend: Backend,
}

impl PostgresStore {
    /// Creates a store from the database settings.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let Some(url) = config.url.as_deref() else {
            return Self::unconfigured("DATABASE_URL environment variable is not set");
        };

        let options = match url.parse::<PgConnectOptions>() {
            Ok(options) => options,
            Err(e) => return Self::unconfigured(format!("invalid DATABASE_URL: {e}")),
        };

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_lazy_with(options);

        Self {
            backend: Backend::Ready(pool),
        }
    }

    /// Creates a store around an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            backend: Backend::Ready(pool),
        }
    }

    /// Creates a store that fails every call with a configuration error.
    #[must_use]
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unconfigured(reason.into()),
        }
    }

    /// Returns the query handle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] when no usable connection
    /// string was configured.
    pub fn acquire(&self) -> Result<&PgPool, StoreError> {
        match &self.backend {
            Backend::Ready(pool) => Ok(pool),
            Backend::Unconfigured(reason) => Err(StoreError::Configuration(reason.clone())),
        }
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn provision(&self) -> Result<(), StoreError> {
        let pool = self.acquire()?;

        let mut tx = pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(PROVISION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&mut *tx).await?;
        sqlx::query(CREATE_INDEX_SQL).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn insert(&self, record: &NewVisitorRecord) -> Result<VisitorRecord, StoreError> {
        let pool = self.acquire()?;

        let row = sqlx::query_as::<_, VisitorRow>(
            "INSERT INTO visitor_records (name, device, latitude, longitude, visit_time) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, device, latitude, longitude, visit_time, created_at",
        )
        .bind(&record.name)
        .bind(record.device.as_deref())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.visit_time)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::Persistence("insert returned no row".to_string()))?;

        Ok(record_from_row(row))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<VisitorRecord>, StoreError> {
        let pool = self.acquire()?;

        let rows = sqlx::query_as::<_, VisitorRow>(
            "SELECT id, name, device, latitude, longitude, visit_time, created_at \
             FROM visitor_records ORDER BY visit_time DESC, id DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(record_from_row).collect())
    }

    async fn probe(&self) -> ProbeReport {
        let pool = match self.acquire() {
            Ok(pool) => pool,
            Err(e) => return ProbeReport::failed(e.to_string(), format!("{e:?}")),
        };

        let result = sqlx::query_as::<_, (String, String, String)>(
            "SELECT version(), current_database()::text, current_user::text",
        )
        .fetch_one(pool)
        .await;

        match result {
            Ok((version, database, user)) => ProbeReport::connected(version, database, user),
            Err(e) => {
                tracing::error!(error = %e, "database probe failed");
                let details = format!("{e:?}");
                ProbeReport::failed(StoreError::from(e).to_string(), details)
            }
        }
    }
}
