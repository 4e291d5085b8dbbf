use trail_types::RecordError;

/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required field was missing or empty on write. The record was not
    /// persisted.
    #[error(transparent)]
    Validation(#[from] RecordError),

    /// The underlying persistence could not be reached, read, or written.
    /// Not retried here; retry policy belongs to the caller.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// The caller-supplied metadata value could not be serialized for
    /// storage.
    #[error("metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// A stored row could not be decoded back into a record.
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
