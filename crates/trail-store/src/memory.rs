use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use trail_types::{RecordDraft, TransformationRecord};

use crate::error::StoreResult;
use crate::traits::LedgerStore;

/// In-memory, `Vec`-backed ledger store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` in
/// append order, so write-order reads fall out of a linear scan. Ids are
/// assigned from a counter inside the lock, which keeps assignment atomic
/// with the append itself.
pub struct InMemoryLedgerStore {
    inner: RwLock<LedgerState>,
}

struct LedgerState {
    records: Vec<TransformationRecord>,
    next_id: i64,
}

impl InMemoryLedgerStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").records.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").records.is_empty()
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn append(&self, draft: RecordDraft) -> StoreResult<TransformationRecord> {
        draft.validate()?;
        let now = Utc::now();
        let mut state = self.inner.write().expect("lock poisoned");
        let id = state.next_id;
        state.next_id += 1;
        let record = draft.into_record(id, now);
        state.records.push(record.clone());
        tracing::debug!(id, dataset_id = %record.dataset_id, "recorded transformation");
        Ok(record)
    }

    async fn find_by_dataset(&self, dataset_id: &str) -> StoreResult<Vec<TransformationRecord>> {
        let state = self.inner.read().expect("lock poisoned");
        // Records are kept in append order, so this is already id-ascending.
        Ok(state
            .records
            .iter()
            .filter(|record| record.dataset_id == dataset_id)
            .cloned()
            .collect())
    }

    async fn list_dataset_ids(&self) -> StoreResult<Vec<String>> {
        let state = self.inner.read().expect("lock poisoned");
        let ids: BTreeSet<&str> = state
            .records
            .iter()
            .map(|record| record.dataset_id.as_str())
            .collect();
        Ok(ids.into_iter().map(String::from).collect())
    }
}

impl std::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerStore")
            .field("record_count", &self.len())
            .finish()
    }
}
