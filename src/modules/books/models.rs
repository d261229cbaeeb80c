use serde::Serialize;

pub use bookshelf_db::{Book, BookId, BookPatch, BookQuery, NewBook};

/// Response body of a successful create.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedBook {
    pub id: BookId,
}
