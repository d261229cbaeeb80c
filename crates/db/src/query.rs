//! Store-side search predicates.

use std::collections::BTreeSet;

use crate::model::Book;
use crate::text::tokenize;

/// A search predicate over book records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookQuery {
    /// Books sharing at least one author with the list (exact, case-sensitive).
    AnyAuthor(Vec<String>),
    /// Books whose title shares at least one word token with the text.
    TitleText(String),
}

/// Secondary index consulted by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexKind {
    Authors,
    Title,
}

impl IndexKind {
    /// Keys under which `book` is filed in this index.
    pub fn keys_for(self, book: &Book) -> BTreeSet<String> {
        match self {
            IndexKind::Authors => book.authors.iter().cloned().collect(),
            IndexKind::Title => tokenize(&book.title),
        }
    }
}

impl BookQuery {
    pub(crate) fn index(&self) -> IndexKind {
        match self {
            BookQuery::AnyAuthor(_) => IndexKind::Authors,
            BookQuery::TitleText(_) => IndexKind::Title,
        }
    }

    /// Index keys to probe; a record matches when it is filed under any of them.
    pub(crate) fn probe_keys(&self) -> BTreeSet<String> {
        match self {
            BookQuery::AnyAuthor(authors) => authors.iter().cloned().collect(),
            BookQuery::TitleText(text) => tokenize(text),
        }
    }
}
