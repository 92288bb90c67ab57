use crate::models::ValidationError;

/// Failure of a store operation, split the way callers need to react to it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Caller-supplied data violates an invariant; fix the input, never retry.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Note not found: {0}")]
    NotFound(i64),

    /// Connectivity, query, pool or schema failure.
    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<ValidationError> for StoreError {
    fn from(e: ValidationError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(Box::new(e))
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        Self::Storage(Box::new(e))
    }
}

impl From<refinery::Error> for StoreError {
    fn from(e: refinery::Error) -> Self {
        Self::Storage(format!("migration failed: {e}").into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(Box::new(e))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Storage(Box::new(e))
    }
}
