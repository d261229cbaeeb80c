//! Book record types as persisted by the store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned identifier of a book. Time-ordered (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for BookId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A persisted book as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub description: String,
    pub authors: Vec<String>,
}

/// Fields of a book that passed the creation contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub authors: Vec<String>,
}

impl NewBook {
    pub(crate) fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            description: self.description,
            authors: self.authors,
        }
    }
}

/// A partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub authors: Option<Vec<String>>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.authors.is_none()
    }

    pub(crate) fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(authors) = &self.authors {
            book.authors = authors.clone();
        }
    }
}

/// On-disk document: the book plus the internal revision counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredBook {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "_rev")]
    pub revision: u64,
}

impl StoredBook {
    pub fn new(book: Book) -> Self {
        Self { book, revision: 0 }
    }

    /// Apply a patch, bumping the revision only when something was sent.
    pub fn update(&mut self, patch: &BookPatch) {
        if patch.is_empty() {
            return;
        }
        patch.apply(&mut self.book);
        self.revision += 1;
    }
}
