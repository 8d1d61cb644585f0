use thiserror::Error;

/// Errors from validating a submitted trade form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} is not a number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("direction must be Long or Short, got {0:?}")]
    InvalidDirection(String),

    #[error("rule compliance must be Yes or No, got {0:?}")]
    InvalidCompliance(String),
}

/// Errors from record store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this identifier exists in the store.
    #[error("trade not found: {0}")]
    NotFound(String),

    /// The store cannot perform this operation (e.g. editing an append-only file).
    #[error("operation not supported by this store: {0}")]
    Unsupported(&'static str),

    /// A stored row could not be interpreted.
    #[error("malformed record at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("JSON error: {0}")]
    Json(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}
