//! Error types for the todo store.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers must tell "the todo
//! does not exist" apart from a storage failure; the HTTP layer maps it to
//! 404 and everything else to a server error. Backend errors keep their
//! source so the cause is visible in logs.

use thiserror::Error;

use crate::todo::TodoId;

/// Errors returned by every `TodoStore` operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No stored todo has the requested id.
    #[error("todo not found: {0}")]
    NotFound(TodoId),

    /// A todo with this id is already stored.
    #[error("todo already exists: {0}")]
    Duplicate(TodoId),

    /// The store was used before `initialize` or after `close`.
    #[error("store not initialized")]
    NotInitialized,

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted row could not be turned back into a `Todo`.
    #[error("invalid persisted todo data: {0}")]
    InvalidData(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
