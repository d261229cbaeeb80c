//! One handler per book operation: validate, call the store once, shape the
//! response. Validation always happens before the store is touched.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use bookshelf_db::SharedStore;
use bookshelf_http::error::AppError;

use super::extract::{BookIdPath, JsonPayload, SearchVerb};
use super::models::{Book, BookQuery, CreatedBook};
use super::query::{authors_query, describe, title_query};
use super::validation::{validate_for_create, validate_for_patch};

type HandlerResult<T> = Result<T, AppError>;

/// Names the id exactly as the client sent it.
fn book_not_found(raw_id: &str) -> AppError {
    AppError::not_found(format!("Book with id {raw_id} not found"))
}

/// `POST /book`
pub async fn create_book(
    State(store): State<SharedStore>,
    JsonPayload(body): JsonPayload,
) -> HandlerResult<(StatusCode, Json<CreatedBook>)> {
    let book = validate_for_create(&body)?;
    let id = store
        .insert(book)
        .await
        .context("failed to save new book")?;

    tracing::info!(book_id = %id, "new book added");
    Ok((StatusCode::CREATED, Json(CreatedBook { id })))
}

/// `GET /book/{book_id}`
pub async fn get_book(
    State(store): State<SharedStore>,
    BookIdPath { id, raw: raw_id }: BookIdPath,
) -> HandlerResult<Json<Book>> {
    let book = store
        .get(id)
        .await
        .with_context(|| format!("failed to look up book {id}"))?;

    match book {
        Some(book) => {
            tracing::info!(book_id = %id, "book found");
            Ok(Json(book))
        }
        None => {
            tracing::info!(book_id = %id, "book not found");
            Err(book_not_found(&raw_id))
        }
    }
}

/// `GET /getAllBooks`
pub async fn list_books(State(store): State<SharedStore>) -> HandlerResult<Json<Vec<Book>>> {
    let books = store.list().await.context("failed to retrieve all books")?;
    tracing::info!(count = books.len(), "books retrieved");
    Ok(Json(books))
}

/// `DELETE /book/{book_id}`
pub async fn delete_book(
    State(store): State<SharedStore>,
    BookIdPath { id, raw: raw_id }: BookIdPath,
) -> HandlerResult<StatusCode> {
    let deleted = store
        .delete(id)
        .await
        .with_context(|| format!("failed to delete book {id}"))?;

    if !deleted {
        tracing::info!(book_id = %id, "no book to delete");
        return Err(book_not_found(&raw_id));
    }
    tracing::info!(book_id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /deleteAllBooks`
pub async fn delete_all_books(State(store): State<SharedStore>) -> HandlerResult<StatusCode> {
    let removed = store
        .delete_all()
        .await
        .context("failed to delete all books")?;
    tracing::info!(removed, "deleted all books");
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /book/{book_id}`
pub async fn patch_book(
    State(store): State<SharedStore>,
    BookIdPath { id, raw: raw_id }: BookIdPath,
    JsonPayload(body): JsonPayload,
) -> HandlerResult<StatusCode> {
    let patch = validate_for_patch(&body)?;
    let updated = store
        .update(id, patch)
        .await
        .with_context(|| format!("failed to update book {id}"))?;

    if !updated {
        tracing::info!(book_id = %id, "no book to update");
        return Err(book_not_found(&raw_id));
    }
    tracing::info!(book_id = %id, "book updated");
    Ok(StatusCode::NO_CONTENT)
}

/// `SEARCH /getBooksByAuthors`
pub async fn search_by_authors(
    State(store): State<SharedStore>,
    _verb: SearchVerb,
    JsonPayload(body): JsonPayload,
) -> HandlerResult<Json<Vec<Book>>> {
    let query = authors_query(&body)?;
    let authors = describe(&query);
    run_search(&store, &query).await.and_then(|books| {
        if books.is_empty() {
            tracing::info!(%authors, "no book found for authors");
            return Err(AppError::not_found(format!(
                "No book found having one or more authors in '{authors}'"
            )));
        }
        tracing::info!(%authors, count = books.len(), "books found for authors");
        Ok(Json(books))
    })
}

/// `SEARCH /getAllBooksByTitle`
pub async fn search_by_title(
    State(store): State<SharedStore>,
    _verb: SearchVerb,
    JsonPayload(body): JsonPayload,
) -> HandlerResult<Json<Vec<Book>>> {
    let query = title_query(&body)?;
    let word = describe(&query);
    run_search(&store, &query).await.and_then(|books| {
        if books.is_empty() {
            tracing::info!(search_word = %word, "no book found for title word");
            return Err(AppError::not_found(format!(
                "No book found with title containing the word '{word}'"
            )));
        }
        tracing::info!(search_word = %word, count = books.len(), "books found for title word");
        Ok(Json(books))
    })
}

async fn run_search(store: &SharedStore, query: &BookQuery) -> HandlerResult<Vec<Book>> {
    let books = store
        .find(query)
        .await
        .with_context(|| format!("failed to search books by {}", describe(query)))?;
    Ok(books)
}
