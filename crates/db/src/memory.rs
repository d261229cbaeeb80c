//! Process-local store guarded by a single async lock.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::index::PostingIndex;
use crate::model::{Book, BookId, BookPatch, NewBook, StoredBook};
use crate::query::{BookQuery, IndexKind};
use crate::{BookStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    next_seq: u64,
    docs: BTreeMap<u64, StoredBook>,
    seqs: HashMap<BookId, u64>,
    authors: PostingIndex,
    title: PostingIndex,
}

impl Inner {
    fn index_mut(&mut self, kind: IndexKind) -> &mut PostingIndex {
        match kind {
            IndexKind::Authors => &mut self.authors,
            IndexKind::Title => &mut self.title,
        }
    }

    fn file(&mut self, book: &Book, seq: u64) {
        for kind in [IndexKind::Authors, IndexKind::Title] {
            let keys = kind.keys_for(book);
            self.index_mut(kind).insert(&keys, seq);
        }
    }

    fn unfile(&mut self, book: &Book, seq: u64) {
        for kind in [IndexKind::Authors, IndexKind::Title] {
            let keys = kind.keys_for(book);
            self.index_mut(kind).remove(&keys, seq);
        }
    }
}

/// In-memory [`BookStore`]. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
        let mut inner = self.inner.write().await;
        let id = BookId::generate();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let stored = StoredBook::new(book.into_book(id));
        inner.file(&stored.book, seq);
        inner.seqs.insert(id, seq);
        inner.docs.insert(seq, stored);
        Ok(id)
    }

    async fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        let inner = self.inner.read().await;
        Ok(inner
            .seqs
            .get(&id)
            .and_then(|seq| inner.docs.get(seq))
            .map(|stored| stored.book.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        let inner = self.inner.read().await;
        Ok(inner.docs.values().map(|stored| stored.book.clone()).collect())
    }

    async fn delete(&self, id: BookId) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(seq) = inner.seqs.remove(&id) else {
            return Ok(false);
        };
        let stored = inner
            .docs
            .remove(&seq)
            .ok_or(StoreError::DanglingIndex { seq })?;
        inner.unfile(&stored.book, seq);
        Ok(true)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let removed = inner.docs.len() as u64;
        inner.docs.clear();
        inner.seqs.clear();
        inner.authors.clear();
        inner.title.clear();
        Ok(removed)
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(&seq) = inner.seqs.get(&id) else {
            return Ok(false);
        };
        let mut stored = inner
            .docs
            .get(&seq)
            .cloned()
            .ok_or(StoreError::DanglingIndex { seq })?;

        inner.unfile(&stored.book, seq);
        stored.update(&patch);
        inner.file(&stored.book, seq);
        inner.docs.insert(seq, stored);
        Ok(true)
    }

    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let inner = self.inner.read().await;
        let index = match query.index() {
            IndexKind::Authors => &inner.authors,
            IndexKind::Title => &inner.title,
        };
        index
            .lookup(&query.probe_keys())
            .into_iter()
            .map(|seq| {
                inner
                    .docs
                    .get(&seq)
                    .map(|stored| stored.book.clone())
                    .ok_or(StoreError::DanglingIndex { seq })
            })
            .collect()
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.inner.read().await.docs.len() as u64)
    }
}
