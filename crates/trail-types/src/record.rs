use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RecordError;

/// One durable transformation event: "dataset `dataset_id` was produced by
/// `operation`, optionally from `source_dataset_id`".
///
/// Records are write-once. `id` and `created_at` are assigned by the store;
/// everything else comes from the caller via [`RecordDraft`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformationRecord {
    /// Store-assigned identifier, strictly increasing in write order.
    pub id: i64,
    /// Identifier of the dataset produced by this event.
    pub dataset_id: String,
    /// Description of the transformation applied.
    pub operation: String,
    /// Dataset consumed to produce `dataset_id`. `None` means no recorded
    /// source; the value need not reference a dataset the store knows about.
    pub source_dataset_id: Option<String>,
    /// Opaque caller-supplied payload. Stored and returned verbatim, never
    /// interpreted.
    pub metadata: Option<Value>,
    /// When the transformation logically occurred (caller-supplied).
    pub timestamp: DateTime<Utc>,
    /// When the record was durably written (store-assigned).
    pub created_at: DateTime<Utc>,
}

/// Write-side input for a [`TransformationRecord`].
///
/// A draft carries everything except the store-assigned `id` and
/// `created_at`. `timestamp` is optional and defaults to write time.
///
/// Drafts deserialized from untrusted input (the HTTP body) must be run
/// through [`RecordDraft::validate`] before persistence; [`RecordDraft::new`]
/// validates eagerly for programmatic construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub dataset_id: String,
    pub operation: String,
    #[serde(default)]
    pub source_dataset_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RecordDraft {
    /// Create a validated draft with no source, metadata, or explicit
    /// timestamp.
    pub fn new(
        dataset_id: impl Into<String>,
        operation: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let draft = Self {
            dataset_id: dataset_id.into(),
            operation: operation.into(),
            source_dataset_id: None,
            metadata: None,
            timestamp: None,
        };
        draft.validate()?;
        Ok(draft)
    }

    /// Set the source dataset this event consumed.
    pub fn with_source(mut self, source_dataset_id: impl Into<String>) -> Self {
        self.source_dataset_id = Some(source_dataset_id.into());
        self
    }

    /// Attach an opaque metadata payload.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set an explicit logical timestamp instead of defaulting to write time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check the draft's required fields. Whitespace-only strings count as
    /// empty. Reports the first failing field.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.dataset_id.trim().is_empty() {
            return Err(RecordError::EmptyField("dataset_id"));
        }
        if self.operation.trim().is_empty() {
            return Err(RecordError::EmptyField("operation"));
        }
        Ok(())
    }

    /// Materialize the full record with store-assigned fields. The store
    /// calls this after validation; `now` is both the `created_at` value and
    /// the `timestamp` fallback.
    pub fn into_record(self, id: i64, now: DateTime<Utc>) -> TransformationRecord {
        TransformationRecord {
            id,
            dataset_id: self.dataset_id,
            operation: self.operation,
            source_dataset_id: self.source_dataset_id,
            metadata: self.metadata,
            timestamp: self.timestamp.unwrap_or(now),
            created_at: now,
        }
    }
}
