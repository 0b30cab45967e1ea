//! Interactive session: one call at a time, results published as text.
//!
//! A [`VisitorSession`] owns the [`IngestionClient`] and a
//! [`tokio::sync::watch`] channel carrying the latest [`SessionView`].
//! While a call is in flight further calls fail fast with
//! [`ClientError::Busy`]. After a successful save the listing is
//! refreshed on a background task once the configured delay elapses.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::api::dto::{HealthResponse, RecordListResponse};
use crate::client::context::VisitorContext;
use crate::client::http::{ClientError, IngestionClient};
use crate::client::render::{render_error, render_probe, render_saved, render_table};
use crate::config::ClientConfig;
use crate::domain::VisitorRecord;

/// What the session currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionView {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// Confirmation of a saved record.
    Saved(String),
    /// Rendered listing table.
    Table(String),
    /// Rendered connectivity probe.
    Status(String),
    /// Rendered error notice.
    Error(String),
}

/// Drives the ingestion client on behalf of one visitor.
#[derive(Debug, Clone)]
pub struct VisitorSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    client: IngestionClient,
    refresh_delay: Duration,
    in_flight: AtomicBool,
    view: watch::Sender<SessionView>,
}

/// Clears the in-flight flag when the call finishes, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl VisitorSession {
    /// Creates a session around an existing client.
    #[must_use]
    pub fn new(client: IngestionClient, refresh_delay: Duration) -> Self {
        let (view, _) = watch::channel(SessionView::Idle);
        Self {
            inner: Arc::new(SessionInner {
                client,
                refresh_delay,
                in_flight: AtomicBool::new(false),
                view,
            }),
        }
    }

    /// Creates a session and its client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(IngestionClient::new(config)?, config.refresh_delay))
    }

    /// Subscribes to view updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view.subscribe()
    }

    /// Current view.
    #[must_use]
    pub fn view(&self) -> SessionView {
        self.inner.view.borrow().clone()
    }

    /// Whether a call is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Saves a visit, then schedules a listing refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if another call is in flight, or the
    /// error of the create call. Either way the error is also published.
    pub async fn submit(&self, visitor: &VisitorContext) -> Result<VisitorRecord, ClientError> {
        let result = {
            let _guard = self.begin()?;
            self.inner.client.create(visitor).await
        };
        match result {
            Ok(response) => {
                self.publish(SessionView::Saved(render_saved(&response)));
                self.schedule_refresh();
                Ok(response.record)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Loads and renders the listing.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if another call is in flight, or the
    /// error of the list call.
    pub async fn refresh(&self) -> Result<RecordListResponse, ClientError> {
        let result = {
            let _guard = self.begin()?;
            self.inner.client.list().await
        };
        match result {
            Ok(listing) => {
                self.publish(SessionView::Table(render_table(&listing)));
                Ok(listing)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Runs the connectivity probe.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Busy`] if another call is in flight, or the
    /// error of the probe call.
    pub async fn check_connection(&self) -> Result<HealthResponse, ClientError> {
        let result = {
            let _guard = self.begin()?;
            self.inner.client.probe().await
        };
        match result {
            Ok(health) => {
                self.publish(SessionView::Status(render_probe(&health)));
                Ok(health)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn begin(&self) -> Result<InFlight<'_>, ClientError> {
        self.inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::Busy)?;
        Ok(InFlight(&self.inner.in_flight))
    }

    fn schedule_refresh(&self) {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(session.inner.refresh_delay).await;
            match session.refresh().await {
                Ok(_) => {}
                // A call started during the delay publishes its own result.
                Err(ClientError::Busy) => {
                    tracing::debug!("skipping scheduled refresh, call in flight");
                }
                Err(e) => tracing::warn!(error = %e, "scheduled refresh failed"),
            }
        });
    }

    fn fail(&self, err: ClientError) -> ClientError {
        self.publish(SessionView::Error(render_error(&err.notice())));
        err
    }

    fn publish(&self, view: SessionView) {
        self.inner.view.send_replace(view);
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::client::test_support::{gateway_url, spawn};

    use axum::Json;
    use axum::Router;
    use axum::routing::get;
    use serde_json::json;

    fn session(base_url: &str, delay: Duration) -> VisitorSession {
        let config = ClientConfig::new(base_url);
        let Ok(client) = IngestionClient::new(&config) else {
            panic!("client should build");
        };
        VisitorSession::new(client, delay)
    }

    #[tokio::test]
    async fn submit_publishes_then_refreshes() {
        let base = gateway_url().await;
        let session = session(&base, Duration::from_millis(50));
        let mut views = session.subscribe();

        let Ok(record) = session.submit(&VisitorContext::new("Ada")).await else {
            panic!("submit should succeed");
        };
        assert_eq!(record.name, "Ada");
        assert!(matches!(session.view(), SessionView::Saved(_)));

        let refreshed = tokio::time::timeout(
            Duration::from_secs(5),
            views.wait_for(|v| matches!(v, SessionView::Table(_))),
        )
        .await;
        let Ok(Ok(view)) = refreshed else {
            panic!("listing should refresh after the delay");
        };
        let SessionView::Table(table) = (*view).clone() else {
            panic!("expected table view");
        };
        assert!(table.contains("Ada"));
        assert!(table.contains("(1 visitors)"));
    }

    #[tokio::test]
    async fn second_call_while_in_flight_is_busy() {
        let slow = Router::new().route(
            "/health",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Json(json!({
                    "success": true,
                    "status": "connected",
                    "version": "test",
                    "database": "db",
                    "user": "u",
                    "message": "Database connection successful"
                }))
            }),
        );
        let base = spawn(slow).await;
        let session = session(&base, Duration::from_secs(60));

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.check_connection().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.is_busy());
        assert!(matches!(
            session.check_connection().await,
            Err(ClientError::Busy)
        ));

        let Ok(Ok(health)) = first.await else {
            panic!("first probe should succeed");
        };
        assert_eq!(health.database, "db");
        assert!(!session.is_busy());
        assert!(matches!(session.view(), SessionView::Status(_)));
    }

    #[tokio::test]
    async fn failure_is_published_and_flag_released() {
        let base = gateway_url().await;
        let session = session(&base, Duration::from_secs(60));

        let result = session.submit(&VisitorContext::new("   ")).await;
        assert!(matches!(
            result,
            Err(ClientError::HttpStatus { status: 400, .. })
        ));
        assert!(!session.is_busy());
        let SessionView::Error(text) = session.view() else {
            panic!("expected error view");
        };
        assert!(text.contains("HTTP 400"));
    }
}
