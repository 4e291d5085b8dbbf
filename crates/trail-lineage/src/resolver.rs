use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use trail_store::LedgerStore;
use trail_types::{LineageNode, OperationEntry, TransformationRecord};

use crate::error::ResolveError;

/// Answers lineage queries by composing ledger store lookups.
///
/// Construct one per store handle and share it freely; it is `Clone` and
/// holds nothing but the `Arc`.
#[derive(Clone)]
pub struct LineageResolver {
    store: Arc<dyn LedgerStore>,
}

impl LineageResolver {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// The flat list of transformation events for `dataset_id`, in write
    /// order. Unknown identifiers yield an empty list.
    pub async fn flat_lineage(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<TransformationRecord>, ResolveError> {
        Ok(self.store.find_by_dataset(dataset_id).await?)
    }

    /// The recursively-expanded lineage graph rooted at `dataset_id`.
    ///
    /// Each node carries one [`OperationEntry`] per record of its dataset
    /// (write order) and one child per distinct `source_dataset_id` those
    /// records reference (first-occurrence order). Recursion follows source
    /// links until it reaches datasets with no records or no sources;
    /// identifiers with no records at all produce terminal nodes, not
    /// errors.
    ///
    /// Cyclic source links are truncated: a dataset already present on the
    /// current root-to-node path becomes a `cycle`-marked leaf instead of
    /// being expanded again. The guard is per-path, so diamond-shaped
    /// lineage (two branches sharing an ancestor) still expands the shared
    /// ancestor in both branches.
    pub async fn lineage_graph(&self, dataset_id: &str) -> Result<LineageNode, ResolveError> {
        let mut path = HashSet::new();
        self.build_node(dataset_id.to_owned(), &mut path).await
    }

    /// Expand one node. `path` holds the dataset ids of this node's
    /// ancestors; the node's own id is added while its sources expand and
    /// removed afterwards.
    ///
    /// Boxed because `async fn` cannot recurse directly. Each store lookup
    /// is an await point, so a caller dropping the future (request timeout,
    /// disconnect) cancels the traversal at a node boundary.
    fn build_node<'a>(
        &'a self,
        dataset_id: String,
        path: &'a mut HashSet<String>,
    ) -> Pin<Box<dyn Future<Output = Result<LineageNode, ResolveError>> + Send + 'a>> {
        Box::pin(async move {
            let records = self.store.find_by_dataset(&dataset_id).await?;
            tracing::debug!(dataset_id = %dataset_id, records = records.len(), "expanding lineage node");

            let mut node = LineageNode::terminal(dataset_id.clone());
            node.operations = records.iter().map(OperationEntry::from).collect();

            // Distinct sources in first-occurrence order.
            let mut seen = HashSet::new();
            let sources: Vec<String> = records
                .iter()
                .filter_map(|record| record.source_dataset_id.clone())
                .filter(|source| seen.insert(source.clone()))
                .collect();

            path.insert(dataset_id.clone());
            for source in sources {
                if path.contains(&source) {
                    tracing::warn!(
                        dataset_id = %dataset_id,
                        source = %source,
                        "cyclic source link; truncating branch"
                    );
                    node.sources.push(LineageNode::cycle(source));
                } else {
                    node.sources.push(self.build_node(source, path).await?);
                }
            }
            path.remove(&dataset_id);

            Ok(node)
        })
    }
}

impl std::fmt::Debug for LineageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineageResolver").finish_non_exhaustive()
    }
}
