use async_trait::async_trait;
use trail_types::{RecordDraft, TransformationRecord};

use crate::error::StoreResult;

/// Append-only record keeper for transformation events.
///
/// All implementations must satisfy these invariants:
/// - `append` assigns `id` and `created_at`; ids are unique and strictly
///   increasing in write order for a given store instance.
/// - A failed `append` leaves the store unchanged — no partial record is
///   ever visible to readers.
/// - `find_by_dataset` returns write order (`id` ascending). An unknown
///   identifier yields an empty vec, not an error.
/// - No update or delete operation exists; records are write-once.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Validate and persist a draft, returning the fully populated record.
    ///
    /// Fails with [`StoreError::Validation`] if `dataset_id` or `operation`
    /// is empty, before anything is written.
    ///
    /// [`StoreError::Validation`]: crate::error::StoreError::Validation
    async fn append(&self, draft: RecordDraft) -> StoreResult<TransformationRecord>;

    /// All records with exactly this `dataset_id`, oldest first.
    async fn find_by_dataset(&self, dataset_id: &str) -> StoreResult<Vec<TransformationRecord>>;

    /// Every distinct `dataset_id` ever written. The reference backends
    /// return sorted order, but callers must not depend on it.
    async fn list_dataset_ids(&self) -> StoreResult<Vec<String>>;
}
