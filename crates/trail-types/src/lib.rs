//! Foundation types for datatrail.
//!
//! This crate provides the record and graph types used throughout the
//! datatrail system. Every other datatrail crate depends on `trail-types`.
//!
//! # Key Types
//!
//! - [`TransformationRecord`] — One durable transformation event, immutable
//!   once written
//! - [`RecordDraft`] — Write-side input for a record, validated before
//!   persistence
//! - [`LineageNode`] — A node in the recursively-expanded lineage graph
//! - [`OperationEntry`] — The per-record projection carried inside a node

pub mod error;
pub mod lineage;
pub mod record;

pub use error::RecordError;
pub use lineage::{LineageNode, OperationEntry};
pub use record::{RecordDraft, TransformationRecord};
