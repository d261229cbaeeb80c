//! Durable store backed by redb.
//!
//! Layout:
//! - `books`: insertion sequence -> JSON document (book plus revision)
//! - `book_ids`: 16-byte book id -> insertion sequence
//! - `authors_index` / `title_index`: term -> sequences (multimap)
//! - `meta`: the next sequence number, never reset
//!
//! Each operation runs in exactly one redb transaction on the blocking pool,
//! so a single-record write is atomic and readers see MVCC snapshots.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{
    Database, MultimapTableDefinition, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};

use crate::model::{Book, BookId, BookPatch, NewBook, StoredBook};
use crate::query::{BookQuery, IndexKind};
use crate::{BookStore, StoreError, StoreResult};

const BOOKS: TableDefinition<u64, &[u8]> = TableDefinition::new("books");
const BOOK_IDS: TableDefinition<&[u8], u64> = TableDefinition::new("book_ids");
const AUTHORS_INDEX: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("authors_index");
const TITLE_INDEX: MultimapTableDefinition<&str, u64> =
    MultimapTableDefinition::new("title_index");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_SEQ_KEY: &str = "next_seq";

fn index_table(kind: IndexKind) -> MultimapTableDefinition<'static, &'static str, u64> {
    match kind {
        IndexKind::Authors => AUTHORS_INDEX,
        IndexKind::Title => TITLE_INDEX,
    }
}

/// File-backed [`BookStore`].
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database file, creating parent directories and
    /// every table.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            txn.open_table(BOOKS)?;
            txn.open_table(BOOK_IDS)?;
            txn.open_table(META)?;
            txn.open_multimap_table(AUTHORS_INDEX)?;
            txn.open_multimap_table(TITLE_INDEX)?;
        }
        txn.commit()?;

        tracing::debug!(path = %path.display(), "redb store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Run `op` against the database on the blocking pool.
    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> StoreResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db)).await?
    }
}

fn decode(bytes: &[u8]) -> StoreResult<StoredBook> {
    Ok(serde_json::from_slice(bytes)?)
}

fn file(txn: &WriteTransaction, book: &Book, seq: u64) -> StoreResult<()> {
    for kind in [IndexKind::Authors, IndexKind::Title] {
        let mut table = txn.open_multimap_table(index_table(kind))?;
        for key in kind.keys_for(book) {
            table.insert(key.as_str(), seq)?;
        }
    }
    Ok(())
}

fn unfile(txn: &WriteTransaction, book: &Book, seq: u64) -> StoreResult<()> {
    for kind in [IndexKind::Authors, IndexKind::Title] {
        let mut table = txn.open_multimap_table(index_table(kind))?;
        for key in kind.keys_for(book) {
            table.remove(key.as_str(), seq)?;
        }
    }
    Ok(())
}

fn write_doc(txn: &WriteTransaction, seq: u64, stored: &StoredBook) -> StoreResult<()> {
    let bytes = serde_json::to_vec(stored)?;
    let mut books = txn.open_table(BOOKS)?;
    books.insert(seq, bytes.as_slice())?;
    Ok(())
}

fn read_doc(txn: &WriteTransaction, seq: u64) -> StoreResult<StoredBook> {
    let books = txn.open_table(BOOKS)?;
    let guard = books
        .get(seq)?
        .ok_or(StoreError::DanglingIndex { seq })?;
    decode(guard.value())
}

fn lookup_seq(txn: &WriteTransaction, id: BookId) -> StoreResult<Option<u64>> {
    let ids = txn.open_table(BOOK_IDS)?;
    let seq = ids.get(id.as_bytes().as_slice())?.map(|guard| guard.value());
    Ok(seq)
}

#[async_trait]
impl BookStore for RedbStore {
    fn backend(&self) -> &'static str {
        "redb"
    }

    async fn insert(&self, book: NewBook) -> StoreResult<BookId> {
        self.blocking(move |db| {
            let id = BookId::generate();
            let stored = StoredBook::new(book.into_book(id));

            let txn = db.begin_write()?;
            {
                let seq = {
                    let mut meta = txn.open_table(META)?;
                    let seq = meta.get(NEXT_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0);
                    meta.insert(NEXT_SEQ_KEY, seq + 1)?;
                    seq
                };
                write_doc(&txn, seq, &stored)?;
                txn.open_table(BOOK_IDS)?
                    .insert(id.as_bytes().as_slice(), seq)?;
                file(&txn, &stored.book, seq)?;
            }
            txn.commit()?;
            Ok(id)
        })
        .await
    }

    async fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        self.blocking(move |db| {
            let txn = db.begin_read()?;
            let ids = txn.open_table(BOOK_IDS)?;
            let Some(seq) = ids.get(id.as_bytes().as_slice())?.map(|g| g.value()) else {
                return Ok(None);
            };
            let books = txn.open_table(BOOKS)?;
            let guard = books
                .get(seq)?
                .ok_or(StoreError::DanglingIndex { seq })?;
            Ok(Some(decode(guard.value())?.book))
        })
        .await
    }

    async fn list(&self) -> StoreResult<Vec<Book>> {
        self.blocking(|db| {
            let txn = db.begin_read()?;
            let books = txn.open_table(BOOKS)?;
            let mut out = Vec::new();
            for entry in books.iter()? {
                let (_, value) = entry?;
                out.push(decode(value.value())?.book);
            }
            Ok(out)
        })
        .await
    }

    async fn delete(&self, id: BookId) -> StoreResult<bool> {
        self.blocking(move |db| {
            let txn = db.begin_write()?;
            {
                let Some(seq) = lookup_seq(&txn, id)? else {
                    return Ok(false);
                };
                let stored = read_doc(&txn, seq)?;
                unfile(&txn, &stored.book, seq)?;
                txn.open_table(BOOKS)?.remove(seq)?;
                txn.open_table(BOOK_IDS)?
                    .remove(id.as_bytes().as_slice())?;
            }
            txn.commit()?;
            Ok(true)
        })
        .await
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        self.blocking(|db| {
            let txn = db.begin_write()?;
            let removed = txn.open_table(BOOKS)?.len()?;
            txn.delete_table(BOOKS)?;
            txn.delete_table(BOOK_IDS)?;
            txn.delete_multimap_table(AUTHORS_INDEX)?;
            txn.delete_multimap_table(TITLE_INDEX)?;
            // Recreate empty tables so later read transactions can open them.
            txn.open_table(BOOKS)?;
            txn.open_table(BOOK_IDS)?;
            txn.open_multimap_table(AUTHORS_INDEX)?;
            txn.open_multimap_table(TITLE_INDEX)?;
            txn.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<bool> {
        self.blocking(move |db| {
            let txn = db.begin_write()?;
            {
                let Some(seq) = lookup_seq(&txn, id)? else {
                    return Ok(false);
                };
                if patch.is_empty() {
                    return Ok(true);
                }
                let mut stored = read_doc(&txn, seq)?;
                unfile(&txn, &stored.book, seq)?;
                stored.update(&patch);
                file(&txn, &stored.book, seq)?;
                write_doc(&txn, seq, &stored)?;
            }
            txn.commit()?;
            Ok(true)
        })
        .await
    }

    async fn find(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let kind = query.index();
        let keys = query.probe_keys();
        self.blocking(move |db| {
            let txn = db.begin_read()?;
            let index = txn.open_multimap_table(index_table(kind))?;
            let mut seqs = BTreeSet::new();
            for key in &keys {
                for seq in index.get(key.as_str())? {
                    seqs.insert(seq?.value());
                }
            }

            let books = txn.open_table(BOOKS)?;
            let mut out = Vec::with_capacity(seqs.len());
            for seq in seqs {
                let guard = books
                    .get(seq)?
                    .ok_or(StoreError::DanglingIndex { seq })?;
                out.push(decode(guard.value())?.book);
            }
            Ok(out)
        })
        .await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.blocking(|db| {
            let txn = db.begin_read()?;
            Ok(txn.open_table(BOOKS)?.len()?)
        })
        .await
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_book(title: &str, authors: &[&str]) -> NewBook {
        NewBook {
            title: title.to_string(),
            description: "description".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("books.redb");

        let id = {
            let store = RedbStore::open(&path).unwrap();
            store.insert(new_book("Durable Book", &["a"])).await.unwrap()
        };

        let store = RedbStore::open(&path).unwrap();
        let book = store.get(id).await.unwrap().unwrap();
        assert_eq!(book.title, "Durable Book");
        assert_eq!(store.count().await.unwrap(), 1);
        let hits = store
            .find(&BookQuery::TitleText("durable".to_string()))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn crud_cycle() {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("books.redb")).unwrap();

        let first = store.insert(new_book("Dummy Book 1", &["a", "b"])).await.unwrap();
        let second = store.insert(new_book("Dummy Book 2", &["c"])).await.unwrap();

        let ids: Vec<BookId> = store.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first, second]);

        let patch = BookPatch {
            authors: Some(vec!["z".to_string()]),
            ..BookPatch::default()
        };
        assert!(store.update(first, patch).await.unwrap());
        assert!(store
            .find(&BookQuery::AnyAuthor(vec!["a".to_string()]))
            .await
            .unwrap()
            .is_empty());
        let by_z = store
            .find(&BookQuery::AnyAuthor(vec!["z".to_string(), "c".to_string()]))
            .await
            .unwrap();
        assert_eq!(by_z.len(), 2);

        assert!(store.delete(second).await.unwrap());
        assert!(!store.delete(second).await.unwrap());
        assert!(!store.update(second, BookPatch::default()).await.unwrap());

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert_eq!(store.delete_all().await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.get(first).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sequence_is_not_reused_after_delete_all() {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(dir.path().join("books.redb")).unwrap();

        store.insert(new_book("One", &["a"])).await.unwrap();
        store.delete_all().await.unwrap();
        let later = store.insert(new_book("Two", &["a"])).await.unwrap();
        let newest = store.insert(new_book("Three", &["a"])).await.unwrap();

        let ids: Vec<BookId> = store
            .find(&BookQuery::AnyAuthor(vec!["a".to_string()]))
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![later, newest]);
    }
}
