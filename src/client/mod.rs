//! Client-side call and render glue for the ingestion service.
//!
//! - [`context`]: visitor attributes sent with each call
//! - [`http`]: typed calls and response checks
//! - [`render`]: plain-text tables and notices
//! - [`session`]: single-flight session publishing rendered views

pub mod context;
pub mod http;
pub mod render;
pub mod session;

pub use context::{GeoPoint, VisitorContext, device_label};
pub use http::{ClientError, ErrorNotice, IngestionClient};
pub use render::{render_error, render_probe, render_saved, render_table};
pub use session::{SessionView, VisitorSession};


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::test_support::{gateway_url, spawn};
    use super::*;
    use crate::config::ClientConfig;

    use axum::Router;
    use axum::http::{StatusCode, header};
    use axum::routing::get;

    fn client(base_url: &str) -> IngestionClient {
        let Ok(client) = IngestionClient::new(&ClientConfig::new(base_url)) else {
            panic!("client should build");
        };
        client
    }

    #[tokio::test]
    async fn create_list_and_probe_against_gateway() {
        let client = client(&gateway_url().await);

        let visitor = VisitorContext::new("Grace")
            .with_device(device_label("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)"))
            .with_location(GeoPoint {
                latitude: 40.4168,
                longitude: -3.7038,
            });
        let Ok(created) = client.create(&visitor).await else {
            panic!("create should succeed");
        };
        assert!(created.success);
        assert_eq!(created.record.name, "Grace");

        let Ok(listing) = client.list().await else {
            panic!("list should succeed");
        };
        assert_eq!(listing.count, 1);
        assert!(render_table(&listing).contains("40.4168"));

        let Ok(health) = client.probe().await else {
            panic!("probe should succeed");
        };
        assert_eq!(health.status, "connected");
        assert!(render_probe(&health).contains(&health.database));
    }

    #[tokio::test]
    async fn html_response_is_unexpected_content_type() {
        let router = Router::new().route(
            "/records",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>oops</html>") }),
        );
        let client = client(&spawn(router).await);

        let Err(err) = client.list().await else {
            panic!("html must not decode");
        };
        let notice = err.notice();
        assert!(notice.message.contains("text/html"));
        assert!(notice.detail.is_some_and(|d| d.contains("<html>oops</html>")));
    }

    #[tokio::test]
    async fn plain_text_server_error_keeps_status() {
        let router = Router::new().route(
            "/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "upstream down") }),
        );
        let client = client(&spawn(router).await);

        let Err(ClientError::HttpStatus {
            status, message, ..
        }) = client.probe().await
        else {
            panic!("expected HttpStatus");
        };
        assert_eq!(status, 503);
        assert_eq!(message, "upstream down");
    }

    #[tokio::test]
    async fn refused_connection_is_transport() {
        let client = client("http://127.0.0.1:1");
        assert!(matches!(client.list().await, Err(ClientError::Transport(_))));
    }
}
