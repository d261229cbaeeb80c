//! Error type shared by every store backend.

use thiserror::Error;

/// Failures raised by a [`crate::BookStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(#[from] redb::DatabaseError),

    #[error("transaction failed: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table access failed: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage failure: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit failed: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("corrupt record: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("index entry {seq} points at a missing record")]
    DanglingIndex { seq: u64 },
}

pub type StoreResult<T> = Result<T, StoreError>;
