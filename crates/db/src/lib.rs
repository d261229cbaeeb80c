//! Book record store.
//!
//! Records live behind the [`BookStore`] trait so handlers can be handed a
//! single shared handle at bootstrap. Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, used by tests and throwaway runs.
//! - [`RedbStore`]: durable, file-backed, built on redb transactions.
//!
//! Both keep a multi-value index on `authors` and a word index on `title`,
//! and return records in insertion order.

use std::sync::Arc;

use async_trait::async_trait;

pub mod connect;
pub mod error;
mod index;
pub mod memory;
pub mod model;
pub mod module;
pub mod persistent;
pub mod query;
pub mod text;

pub use connect::connect;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use model::{Book, BookId, BookPatch, NewBook};
pub use module::DbModule;
pub use persistent::RedbStore;
pub use query::BookQuery;

/// Shared handle to the process-wide store.
pub type SharedStore = Arc<dyn BookStore>;

/// Persistent collection of book records.
///
/// Every method is a single atomic operation against the backend.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Persist a new record and return its generated id.
    async fn insert(&self, book: NewBook) -> StoreResult<BookId>;

    async fn get(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// Every record, in insertion order.
    async fn list(&self) -> StoreResult<Vec<Book>>;

    /// Returns `false` when no record had this id.
    async fn delete(&self, id: BookId) -> StoreResult<bool>;

    /// Remove every record and return how many were removed.
    async fn delete_all(&self) -> StoreResult<u64>;

    /// Apply a partial update. Returns `false` when no record had this id.
    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<bool>;

    /// Records matching the query, in insertion order.
    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>>;

    async fn count(&self) -> StoreResult<u64>;
}
