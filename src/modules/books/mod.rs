//! Books: catalog lookup, stored reading records and reading statistics.

pub mod catalog;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod stats;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use leeslog_kernel::{InitCtx, Module};
use serde_json::json;

pub use error::BooksError;
pub use service::{BookService, Dashboard};

pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(service: Arc<BookService>) -> Self {
        Self { service }
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
            store = ?ctx.settings.store.backend,
            base = %ctx.settings.store.base,
            catalog = %self.service.catalog().base_url(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::api::router(self.service.clone())
    }

    fn pages(&self) -> Router {
        routes::pages::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
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

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let text = json!({ "type": "string" });
    let book_ref = json!({ "$ref": "#/components/schemas/Book" });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List stored books, newest end date first",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Stored books", json!({ "type": "array", "items": book_ref })),
                        "502": error_response("Record store unavailable")
                    }
                },
                "post": {
                    "summary": "Store a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookForm" }
                            }
                        }
                    },
                    "responses": {
                        "201": json_response("Key of the stored book", json!({
                            "type": "object",
                            "properties": { "key": text },
                            "required": ["key"]
                        })),
                        "422": error_response("Title or author missing, or rating out of range"),
                        "502": error_response("Record store unavailable")
                    }
                }
            },
            "/{key}": {
                "delete": {
                    "summary": "Expire a stored book",
                    "tags": ["Books"],
                    "parameters": [{
                        "name": "key",
                        "in": "path",
                        "required": true,
                        "schema": text
                    }],
                    "responses": {
                        "204": { "description": "Book expires now" },
                        "502": error_response("Record store unavailable")
                    }
                }
            },
            "/lookup": {
                "get": {
                    "summary": "Look a title up in the catalog",
                    "tags": ["Books"],
                    "parameters": [{
                        "name": "title",
                        "in": "query",
                        "required": true,
                        "schema": text
                    }],
                    "responses": {
                        "200": json_response("Draft with placeholder rating and dates", json!({
                            "type": "object",
                            "properties": {
                                "book": { "$ref": "#/components/schemas/NewBook" },
                                "source_url": text
                            }
                        })),
                        "404": error_response("No book found for this title"),
                        "422": error_response("Blank title"),
                        "502": error_response("Catalog unavailable")
                    }
                }
            },
            "/stats": {
                "get": {
                    "summary": "Reading statistics and records left out of them",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Statistics", json!({ "type": "object" })),
                        "502": error_response("Record store unavailable")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": text } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "key": text,
                        "title": text,
                        "author": text,
                        "rating": { "type": ["integer", "null"], "minimum": 1, "maximum": 5 },
                        "language": text,
                        "start_date": text,
                        "end_date": text,
                        "genre": text,
                        "release_date": text,
                        "pages": text,
                        "cover_url": { "type": ["string", "null"] }
                    },
                    "required": ["key", "title", "author"]
                },
                "NewBook": {
                    "type": "object",
                    "properties": {
                        "title": text,
                        "author": text,
                        "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "language": text,
                        "start_date": text,
                        "end_date": text,
                        "genre": text,
                        "release_date": text,
                        "pages": text,
                        "cover_url": { "type": ["string", "null"] }
                    },
                    "required": ["title", "author", "rating"]
                },
                "BookForm": {
                    "type": "object",
                    "properties": {
                        "title": text,
                        "author": text,
                        "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                        "language": text,
                        "start_date": { "type": "string", "format": "date" },
                        "end_date": { "type": "string", "format": "date" },
                        "genre": text,
                        "release_date": text,
                        "pages": text,
                        "cover_url": text
                    },
                    "required": ["title", "author", "rating", "start_date", "end_date"]
                }
            }
        }
    })
}
