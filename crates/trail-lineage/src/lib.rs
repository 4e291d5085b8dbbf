//! Lineage resolution for datatrail.
//!
//! The [`LineageResolver`] composes ledger store lookups into the two query
//! shapes the system answers:
//!
//! - **Flat lineage** — the ordered list of transformation events recorded
//!   under one dataset identifier. A single store lookup.
//! - **Graph lineage** — the tree formed by recursively following each
//!   dataset's `source_dataset_id` links until reaching datasets with no
//!   recorded source.
//!
//! The resolver holds no state beyond its store handle; concurrent queries
//! need no coordination because records are write-once.

pub mod error;
pub mod resolver;

pub use error::ResolveError;
pub use resolver::LineageResolver;
