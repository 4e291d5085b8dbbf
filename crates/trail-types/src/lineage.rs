use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::TransformationRecord;

/// A node in the recursively-expanded lineage graph.
///
/// Each node aggregates every transformation event recorded under one
/// dataset identifier (`operations`, in write order) and links to one child
/// node per distinct source dataset referenced by those events (`sources`,
/// in first-occurrence order).
///
/// A node with no `sources` is terminal: either its records name no source,
/// or no records exist for the identifier at all. Absence is not an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineageNode {
    pub dataset_id: String,
    pub operations: Vec<OperationEntry>,
    pub sources: Vec<LineageNode>,
    /// Set when graph expansion found this dataset already on the current
    /// path and truncated the branch instead of recursing. Truncated nodes
    /// carry no operations or sources.
    #[serde(default, skip_serializing_if = "is_false")]
    pub cycle: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl LineageNode {
    /// A node with no recorded operations or sources.
    pub fn terminal(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            operations: Vec::new(),
            sources: Vec::new(),
            cycle: false,
        }
    }

    /// A truncation marker for a dataset revisited along the current path.
    pub fn cycle(dataset_id: impl Into<String>) -> Self {
        Self {
            cycle: true,
            ..Self::terminal(dataset_id)
        }
    }

    /// Returns `true` if this node has no sources.
    pub fn is_terminal(&self) -> bool {
        self.sources.is_empty()
    }

    /// Depth of the graph rooted at this node (a lone node has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .sources
            .iter()
            .map(LineageNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// The per-record projection carried inside a [`LineageNode`].
///
/// Only `{operation, timestamp, metadata}` are repeated at the node level;
/// `id`, `created_at`, and `source_dataset_id` live on the full record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<Value>,
}

impl From<&TransformationRecord> for OperationEntry {
    fn from(record: &TransformationRecord) -> Self {
        Self {
            operation: record.operation.clone(),
            timestamp: record.timestamp,
            metadata: record.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDraft;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn terminal_node_is_empty() {
        let node = LineageNode::terminal("raw");
        assert_eq!(node.dataset_id, "raw");
        assert!(node.operations.is_empty());
        assert!(node.sources.is_empty());
        assert!(node.is_terminal());
        assert!(!node.cycle);
    }

    #[test]
    fn cycle_node_is_marked_and_terminal() {
        let node = LineageNode::cycle("loop");
        assert!(node.cycle);
        assert!(node.is_terminal());
    }

    #[test]
    fn depth_counts_longest_chain() {
        let mut root = LineageNode::terminal("final");
        let mut mid = LineageNode::terminal("clean");
        mid.sources.push(LineageNode::terminal("raw"));
        root.sources.push(mid);
        root.sources.push(LineageNode::terminal("lookup"));
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn operation_entry_projects_record_fields() {
        let record = RecordDraft::new("clean", "dedupe")
            .unwrap()
            .with_source("raw")
            .with_metadata(json!({"dropped": 3}))
            .into_record(5, sample_time());
        let entry = OperationEntry::from(&record);
        assert_eq!(entry.operation, "dedupe");
        assert_eq!(entry.timestamp, sample_time());
        assert_eq!(entry.metadata, Some(json!({"dropped": 3})));
    }

    #[test]
    fn cycle_flag_omitted_from_json_when_false() {
        let json = serde_json::to_string(&LineageNode::terminal("raw")).unwrap();
        assert!(!json.contains("cycle"));

        let json = serde_json::to_string(&LineageNode::cycle("loop")).unwrap();
        assert!(json.contains("\"cycle\":true"));
    }

    #[test]
    fn node_json_shape() {
        let mut node = LineageNode::terminal("final");
        node.operations.push(OperationEntry {
            operation: "aggregate".into(),
            timestamp: sample_time(),
            metadata: None,
        });
        node.sources.push(LineageNode::terminal("clean"));

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["dataset_id"], "final");
        assert_eq!(value["operations"][0]["operation"], "aggregate");
        assert_eq!(value["sources"][0]["dataset_id"], "clean");
    }

    #[test]
    fn node_serde_roundtrip() {
        let mut node = LineageNode::terminal("final");
        node.sources.push(LineageNode::cycle("final"));
        let json = serde_json::to_string(&node).unwrap();
        let parsed: LineageNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, node);
    }
}
