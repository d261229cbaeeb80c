//! Route table for the books module.
//!
//! Method routers on known paths answer unknown verbs with the 501 reply, so
//! `PUT /book/{id}` gets the same treatment as an unknown path. The two
//! search paths accept every verb and let [`SearchVerb`](super::extract::SearchVerb)
//! sort it out, since `SEARCH` is not a method axum can filter on.

use axum::{
    routing::{any, delete, get, post},
    Router,
};
use bookshelf_db::SharedStore;
use bookshelf_http::router::not_implemented;

use super::handlers;

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route(
            "/book",
            post(handlers::create_book).fallback(not_implemented),
        )
        .route(
            "/book/{book_id}",
            get(handlers::get_book)
                .delete(handlers::delete_book)
                .patch(handlers::patch_book)
                .fallback(not_implemented),
        )
        .route(
            "/getAllBooks",
            get(handlers::list_books).fallback(not_implemented),
        )
        .route(
            "/deleteAllBooks",
            delete(handlers::delete_all_books).fallback(not_implemented),
        )
        .route("/getBooksByAuthors", any(handlers::search_by_authors))
        .route("/getAllBooksByTitle", any(handlers::search_by_title))
        .with_state(store)
}
