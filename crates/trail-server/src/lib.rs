//! HTTP server for datatrail.
//!
//! Exposes the ledger's three contract operations plus a dataset listing
//! over REST: record a transformation, fetch flat lineage, fetch the
//! recursive lineage graph, and enumerate dataset identifiers. Exact JSON
//! shapes live in [`schema`]; error-to-status mapping lives in [`error`].

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod schema;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use schema::{FlatLineageResponse, GraphResponse, HealthResponse, RecordResponse};
pub use server::TrailServer;
pub use state::AppState;
