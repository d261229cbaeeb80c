//! The books module: CRUD and search over book records.

pub mod extract;
pub mod handlers;
pub mod models;
pub mod query;
pub mod routes;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::SharedStore;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::{json, Value};

/// Book routes bound to an injected store handle.
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = self.store.backend(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_document())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn book_list(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/Book" }
                }
            }
        }
    })
}

/// `SEARCH` is not an OpenAPI operation key, so the search routes are
/// described under the `x-search` extension.
fn openapi_document() -> Value {
    let book_id = json!([{
        "name": "book_id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    }]);

    json!({
        "paths": {
            "/book": {
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": json_body("NewBook"),
                    "responses": {
                        "201": {
                            "description": "Book created",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "id": { "type": "string", "format": "uuid" } },
                                        "required": ["id"]
                                    }
                                }
                            }
                        },
                        "400": error_response("Invalid book payload"),
                        "500": error_response("Store failure")
                    }
                }
            },
            "/book/{book_id}": {
                "get": {
                    "summary": "Get a book by id",
                    "tags": ["Books"],
                    "parameters": book_id.clone(),
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "400": error_response("Malformed book id"),
                        "404": error_response("No book with this id")
                    }
                },
                "delete": {
                    "summary": "Delete a book by id",
                    "tags": ["Books"],
                    "parameters": book_id.clone(),
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "400": error_response("Malformed book id"),
                        "404": error_response("No book with this id")
                    }
                },
                "patch": {
                    "summary": "Update some fields of a book",
                    "tags": ["Books"],
                    "parameters": book_id,
                    "requestBody": json_body("BookPatch"),
                    "responses": {
                        "204": { "description": "Book updated" },
                        "400": error_response("Malformed id or invalid patch"),
                        "404": error_response("No book with this id")
                    }
                }
            },
            "/getAllBooks": {
                "get": {
                    "summary": "List every book in insertion order",
                    "tags": ["Books"],
                    "responses": {
                        "200": book_list("All books"),
                        "500": error_response("Store failure")
                    }
                }
            },
            "/deleteAllBooks": {
                "delete": {
                    "summary": "Delete every book",
                    "tags": ["Books"],
                    "responses": {
                        "204": { "description": "Collection emptied" },
                        "500": error_response("Store failure")
                    }
                }
            },
            "/getBooksByAuthors": {
                "x-search": {
                    "summary": "Books sharing at least one author with the query",
                    "tags": ["Books"],
                    "requestBody": json_body("AuthorsSearch"),
                    "responses": {
                        "200": book_list("Matching books"),
                        "400": error_response("Missing or malformed authors"),
                        "404": error_response("No matching book")
                    }
                }
            },
            "/getAllBooksByTitle": {
                "x-search": {
                    "summary": "Books whose title contains the search word",
                    "tags": ["Books"],
                    "requestBody": json_body("TitleSearch"),
                    "responses": {
                        "200": book_list("Matching books"),
                        "400": error_response("Missing or malformed search word"),
                        "404": error_response("No matching book")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "authors": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["id", "title", "description", "authors"]
                },
                "NewBook": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string", "minLength": 1 },
                        "authors": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string", "minLength": 1 }
                        }
                    },
                    "required": ["title", "description", "authors"]
                },
                "BookPatch": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "description": { "type": "string", "minLength": 1 },
                        "authors": {
                            "type": "array",
                            "minItems": 1,
                            "items": { "type": "string", "minLength": 1 }
                        }
                    }
                },
                "AuthorsSearch": {
                    "type": "object",
                    "properties": {
                        "authors": { "type": "array", "minItems": 1, "items": { "type": "string" } }
                    },
                    "required": ["authors"]
                },
                "TitleSearch": {
                    "type": "object",
                    "properties": {
                        "searchWord": { "type": "string", "minLength": 1 }
                    },
                    "required": ["searchWord"]
                }
            }
        }
    })
}

/// Create the books module around a shared store handle
pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
