//! Request and response bodies for the REST API.
//!
//! The write body is [`trail_types::RecordDraft`] verbatim; only the
//! response shapes live here.

use serde::{Deserialize, Serialize};
use trail_types::{LineageNode, TransformationRecord};

/// Response to a successful record write.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub record_id: i64,
    pub dataset_id: String,
}

/// Flat lineage: every record for one dataset identifier, oldest first.
/// `records` is empty (not an error) for identifiers never written to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlatLineageResponse {
    pub dataset_id: String,
    pub records: Vec<TransformationRecord>,
}

/// Graph lineage: the recursively-expanded tree rooted at `dataset_id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphResponse {
    pub dataset_id: String,
    pub graph: LineageNode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            service: "trail-server".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
