//! Append-only ledger storage for datatrail.
//!
//! This crate is the record keeper of the system: every transformation event
//! is persisted exactly once and never updated or deleted. Queries are point
//! lookups by dataset identifier plus a distinct-identifier enumeration;
//! everything richer (graph expansion) is layered on top by `trail-lineage`.
//!
//! # Storage Backends
//!
//! All backends implement the [`LedgerStore`] trait:
//!
//! - [`InMemoryLedgerStore`] — `Vec`-backed store for tests and embedding
//! - [`SqliteLedgerStore`] — durable SQLite store via `sqlx`
//!
//! # Design Rules
//!
//! 1. Records are immutable once written; the store exposes no update or
//!    delete operation.
//! 2. `id` assignment is store-local and strictly increasing in write order.
//! 3. Validation happens before any write: a failed append leaves the store
//!    unchanged.
//! 4. The store never interprets `metadata` — it is stored and returned
//!    verbatim.
//! 5. All storage errors are propagated, never silently ignored or retried.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryLedgerStore;
pub use sqlite::SqliteLedgerStore;
pub use traits::LedgerStore;
