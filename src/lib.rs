//! # visitor-gateway
//!
//! HTTP service that ingests and lists website visitor records, plus a
//! typed client that calls it and renders the results as text.
//!
//! Records are stored in PostgreSQL. The `visitor_records` table is
//! created on first write, so a fresh database needs no migration step.
//!
//! ## Architecture
//!
//! ```text
//! Clients (browser, VisitorSession)
//!     │
//!     ├── REST Handlers (api/)         POST/GET /records, GET /health
//!     │
//!     ├── RecordService (service/)     validate, provision, insert, list
//!     │
//!     ├── RecordStore (persistence/)
//!     │     ├── PostgresStore          sqlx pool, lazy connect
//!     │     └── MemoryStore            tests and local runs
//!     │
//!     └── PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
