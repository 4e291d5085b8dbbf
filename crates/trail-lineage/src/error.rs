use trail_store::StoreError;

/// Errors from lineage resolution.
///
/// The resolver adds no failure modes of its own: the only error condition
/// is store unavailability, propagated unchanged. Unknown dataset ids are
/// valid queries with empty results, never errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
