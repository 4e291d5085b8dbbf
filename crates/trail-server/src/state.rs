use std::sync::Arc;

use trail_lineage::LineageResolver;
use trail_store::LedgerStore;

/// Shared handler state: the store for writes, the resolver for reads.
///
/// The store is injected at construction; handlers never reach for ambient
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub resolver: LineageResolver,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        let resolver = LineageResolver::new(Arc::clone(&store));
        Self { store, resolver }
    }
}
