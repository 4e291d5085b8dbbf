use thiserror::Error;

/// Errors produced when constructing or validating records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required field is missing or empty. Carries the field name so the
    /// caller can report exactly what was wrong with the write.
    #[error("required field `{0}` is missing or empty")]
    EmptyField(&'static str),
}

impl RecordError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyField(field) => field,
        }
    }
}
