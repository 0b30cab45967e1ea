//! HTTP client for the ingestion service.
//!
//! Every response goes through the same checks, in order: HTTP status,
//! `Content-Type`, then JSON parsing. Each check failing is a different
//! [`ClientError`] variant with its own user-facing [`ErrorNotice`].

use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::dto::{CreateRecordResponse, HealthResponse, RecordListResponse};
use crate::client::context::VisitorContext;
use crate::config::ClientConfig;
use crate::error::ErrorResponse;

/// Characters of a raw response body kept for diagnostics.
const SNIPPET_CHARS: usize = 200;

/// Message plus optional diagnostic detail, ready to show to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    /// Main message.
    pub message: String,
    /// Extra diagnostic text.
    pub detail: Option<String>,
}

/// Client-side failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Message from the error body, or the raw body.
        message: String,
        /// Diagnostic detail from the error body, if any.
        details: Option<String>,
    },

    /// 2xx response whose content type is not JSON.
    #[error("invalid response format - expected JSON, got {content_type}")]
    UnexpectedContentType {
        /// Content type received (`unknown` when absent).
        content_type: String,
        /// Start of the body.
        snippet: String,
    },

    /// JSON content type but the body could not be parsed.
    #[error("failed to parse JSON response: {reason}")]
    MalformedJson {
        /// Parser error.
        reason: String,
        /// Start of the body.
        snippet: String,
    },

    /// 2xx response carrying `success: false`.
    #[error("{error} - {message}")]
    Rejected {
        /// Error kind reported by the server.
        error: String,
        /// Message reported by the server.
        message: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Another call is still in flight.
    #[error("another request is already in progress")]
    Busy,
}

impl ClientError {
    /// Builds the user-facing message for this failure.
    #[must_use]
    pub fn notice(&self) -> ErrorNotice {
        match self {
            Self::HttpStatus {
                status,
                message,
                details,
            } => ErrorNotice {
                message: format!("Request failed (HTTP {status}): {message}"),
                detail: details.clone(),
            },
            Self::UnexpectedContentType {
                content_type,
                snippet,
            } => ErrorNotice {
                message: format!("Invalid response format - expected JSON, got {content_type}"),
                detail: Some(format!("Response: {snippet}")),
            },
            Self::MalformedJson { reason, snippet } => ErrorNotice {
                message: format!("Failed to parse JSON response: {reason}"),
                detail: Some(format!("Response: {snippet}")),
            },
            Self::Rejected { error, message } => ErrorNotice {
                message: format!("Error: {error} - {message}"),
                detail: None,
            },
            Self::Transport(e) => ErrorNotice {
                message: format!("Connection error: {e}"),
                detail: Some(format!("{e:?}")),
            },
            Self::Busy => ErrorNotice {
                message: "A request is already in progress".to_string(),
                detail: None,
            },
        }
    }
}

/// Typed client for `/records` and `/health`.
#[derive(Debug, Clone)]
pub struct IngestionClient {
    http: reqwest::Client,
    base_url: String,
}

impl IngestionClient {
    /// Creates a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the HTTP client cannot be
    /// built (TLS backend initialisation).
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /records` with the visitor's attributes.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] describing which response check failed.
    pub async fn create(&self, visitor: &VisitorContext) -> Result<CreateRecordResponse, ClientError> {
        tracing::debug!(name = %visitor.name, "saving visitor record");
        let request = self
            .http
            .post(format!("{}/records", self.base_url))
            .json(&visitor.to_request());
        self.execute(request).await
    }

    /// `GET /records`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] describing which response check failed.
    pub async fn list(&self) -> Result<RecordListResponse, ClientError> {
        let request = self.http.get(format!("{}/records", self.base_url));
        self.execute(request).await
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] describing which response check failed.
    pub async fn probe(&self) -> Result<HealthResponse, ClientError> {
        let request = self.http.get(format!("{}/health", self.base_url));
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        let result = decode_response(status, content_type.as_deref(), &body);
        if let Err(e) = &result {
            tracing::warn!(status, error = %e, "ingestion request failed");
        }
        result
    }
}

/// Applies the status, content-type and JSON checks to a response.
///
/// # Errors
///
/// Returns [`ClientError::HttpStatus`], [`ClientError::UnexpectedContentType`],
/// [`ClientError::MalformedJson`] or [`ClientError::Rejected`].
pub fn decode_response<T: DeserializeOwned>(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<T, ClientError> {
    if !(200..300).contains(&status) {
        return Err(match serde_json::from_str::<ErrorResponse>(body) {
            Ok(err) => ClientError::HttpStatus {
                status,
                message: err.message,
                details: err.details,
            },
            Err(_) => ClientError::HttpStatus {
                status,
                message: if body.trim().is_empty() {
                    "request failed".to_string()
                } else {
                    snippet(body)
                },
                details: Some(format!("Response was not valid JSON. Status: {status}")),
            },
        });
    }

    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if !is_json {
        return Err(ClientError::UnexpectedContentType {
            content_type: content_type.unwrap_or("unknown").to_string(),
            snippet: snippet(body),
        });
    }

    let malformed = |e: serde_json::Error| ClientError::MalformedJson {
        reason: e.to_string(),
        snippet: snippet(body),
    };

    let value: Value = serde_json::from_str(body).map_err(malformed)?;
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let err: ErrorResponse = serde_json::from_value(value).map_err(malformed)?;
        return Err(ClientError::Rejected {
            error: err.error,
            message: err.message,
        });
    }
    serde_json::from_value(value).map_err(malformed)
}

fn snippet(body: &str) -> String {
    body.chars().take(SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");

    #[test]
    fn non_2xx_uses_error_body() {
        let body = r#"{"success":false,"error":"validation_error","message":"name must be a string"}"#;
        let result = decode_response::<RecordListResponse>(400, JSON, body);
        let Err(ClientError::HttpStatus {
            status, message, ..
        }) = result
        else {
            panic!("expected HttpStatus");
        };
        assert_eq!(status, 400);
        assert_eq!(message, "name must be a string");
    }

    #[test]
    fn non_2xx_with_text_body_keeps_raw_text() {
        let result = decode_response::<RecordListResponse>(502, Some("text/html"), "Bad Gateway");
        let Err(err @ ClientError::HttpStatus { .. }) = result else {
            panic!("expected HttpStatus");
        };
        let notice = err.notice();
        assert!(notice.message.contains("502"));
        assert!(notice.message.contains("Bad Gateway"));
        assert!(notice.detail.is_some_and(|d| d.contains("not valid JSON")));
    }

    #[test]
    fn non_json_content_type_is_its_own_shape() {
        let result = decode_response::<RecordListResponse>(200, Some("text/html"), "<html></html>");
        let Err(ClientError::UnexpectedContentType { content_type, .. }) = result else {
            panic!("expected UnexpectedContentType");
        };
        assert_eq!(content_type, "text/html");

        let missing = decode_response::<RecordListResponse>(200, None, "{}");
        assert!(matches!(
            missing,
            Err(ClientError::UnexpectedContentType { .. })
        ));
    }

    #[test]
    fn unparseable_json_is_its_own_shape() {
        let result = decode_response::<RecordListResponse>(200, JSON, "{not json");
        assert!(matches!(result, Err(ClientError::MalformedJson { .. })));
    }

    #[test]
    fn success_false_is_rejected() {
        let body = r#"{"success":false,"error":"connection_error","message":"database connection failed"}"#;
        let result = decode_response::<RecordListResponse>(200, JSON, body);
        let Err(ClientError::Rejected { error, .. }) = result else {
            panic!("expected Rejected");
        };
        assert_eq!(error, "connection_error");
    }

    #[test]
    fn listing_decodes() {
        let body = r#"{"success":true,"count":0,"records":[],"message":"No visitor records yet."}"#;
        let Ok(listing) =
            decode_response::<RecordListResponse>(200, Some("application/json; charset=utf-8"), body)
        else {
            panic!("expected listing");
        };
        assert_eq!(listing.count, 0);
        assert!(listing.message.is_some());
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(snippet(&long).len(), SNIPPET_CHARS);
    }
}
