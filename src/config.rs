//! Service and client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). A missing `DATABASE_URL` is not a
//! startup error; the record endpoints fail with a configuration error
//! on first use instead.

use std::net::SocketAddr;
use std::time::Duration;

/// Deployment environment. Controls whether diagnostic details are
/// included in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Diagnostics are stripped from error bodies.
    #[default]
    Production,
    /// Diagnostics (raw backend error text) are returned in `details`.
    Development,
}

impl Environment {
    /// Parses `APP_ENV`-style values. Anything other than a recognised
    /// development name is treated as production.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" | "test" => Self::Development,
            _ => Self::Production,
        }
    }

    /// Returns `true` when error responses may carry diagnostic details.
    #[must_use]
    pub const fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string, if configured.
    pub url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub max_connections: u32,

    /// Minimum idle connections in the pool.
    pub min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Returns the connection acquire timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 0,
            connect_timeout_secs: 5,
        }
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Database settings.
    pub database: DatabaseConfig,

    /// Deployment environment.
    pub environment: Environment,

    /// Log output format.
    pub log_format: LogFormat,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", defaults.max_connections),
            min_connections: parse_env("DATABASE_MIN_CONNECTIONS", defaults.min_connections),
            connect_timeout_secs: parse_env(
                "DATABASE_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
        };

        let environment = std::env::var("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or_default();

        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            database,
            environment,
            log_format,
        })
    }
}

/// Ingestion client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the ingestion service, without a trailing slash.
    pub base_url: String,

    /// Delay between a successful save and the follow-up listing refresh.
    pub refresh_delay: Duration,

    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for the given base URL with default
    /// timings (1 s refresh delay, 10 s request timeout).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            refresh_delay: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Loads client settings from `VISITOR_API_URL`,
    /// `VISITOR_REFRESH_DELAY_MS` and `VISITOR_REQUEST_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("VISITOR_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let mut config = Self::new(base_url);
        config.refresh_delay = Duration::from_millis(parse_env("VISITOR_REFRESH_DELAY_MS", 1000));
        config.request_timeout =
            Duration::from_secs(parse_env("VISITOR_REQUEST_TIMEOUT_SECS", 10));
        config
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
