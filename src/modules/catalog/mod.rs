//! Books and authors catalog: upserts, filtered listing, and seed resets.

pub mod models;
pub mod routes;
pub mod seed;
pub mod service;
pub mod validation;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_db::SqliteStore;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use models::{Author, Book};
use routes::CatalogState;
use seed::SeedSource;
use service::CatalogService;

pub struct CatalogModule {
    state: CatalogState,
}

impl CatalogModule {
    pub fn new(store: SqliteStore, seed: SeedSource) -> Self {
        Self {
            state: CatalogState {
                service: CatalogService::new(Arc::new(store)),
                seed,
            },
        }
    }

    pub fn service(&self) -> &CatalogService<SqliteStore> {
        &self.state.service
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            seed = ?self.state.seed,
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE authors (
                    id   TEXT PRIMARY KEY NOT NULL,
                    name TEXT NOT NULL
                );
                CREATE INDEX idx_authors_name ON authors (name);

                CREATE TABLE books (
                    id          TEXT PRIMARY KEY NOT NULL,
                    title       TEXT NOT NULL,
                    author_id   TEXT NOT NULL,
                    description TEXT NOT NULL,
                    pages       INTEGER NOT NULL CHECK (pages >= 0),
                    language    TEXT NOT NULL,
                    genre       TEXT NOT NULL
                );
                CREATE INDEX idx_books_title ON books (title);
                CREATE INDEX idx_books_author_id ON books (author_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let store = self.state.service.store();
        tracing::info!(
            module = self.name(),
            books = store.count::<Book>()?,
            authors = store.count::<Author>()?,
            "catalog module started"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
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

fn json_request(schema_ref: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": { "schema": { "$ref": schema_ref } }
        }
    })
}

fn query_param(name: &str, kind: &str, description: &str) -> serde_json::Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": kind }
    })
}

fn id_param(description: &str) -> serde_json::Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let book_ref = json!({ "$ref": "#/components/schemas/Book" });
    let author_ref = json!({ "$ref": "#/components/schemas/Author" });

    json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "List books matching every provided filter",
                    "tags": ["Catalog"],
                    "parameters": [
                        query_param("title", "string", "Case-sensitive substring of the title"),
                        query_param("author_id", "string", "Exact author identifier"),
                        query_param("language", "string", "Exact language"),
                        query_param("min_pages", "integer", "Inclusive lower bound on pages"),
                        query_param("max_pages", "integer", "Inclusive upper bound on pages"),
                        query_param("genre", "string", "Exact genre")
                    ],
                    "responses": {
                        "200": json_response("Matching books", json!({ "type": "array", "items": book_ref })),
                        "422": error_response("Malformed filter")
                    }
                },
                "post": {
                    "summary": "Create or fully replace a book",
                    "tags": ["Catalog"],
                    "requestBody": json_request("#/components/schemas/Book"),
                    "responses": {
                        "200": json_response("The book as submitted", book_ref.clone()),
                        "400": error_response("Body is not JSON"),
                        "422": error_response("Missing or mistyped field")
                    }
                }
            },
            "/books/{id}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Catalog"],
                    "parameters": [id_param("Book identifier")],
                    "responses": {
                        "200": json_response("The stored book", book_ref.clone()),
                        "404": error_response("No book with this identifier")
                    }
                }
            },
            "/authors": {
                "get": {
                    "summary": "List every author",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": json_response("All authors", json!({ "type": "array", "items": author_ref }))
                    }
                },
                "post": {
                    "summary": "Create or fully replace an author",
                    "tags": ["Catalog"],
                    "requestBody": json_request("#/components/schemas/Author"),
                    "responses": {
                        "200": json_response("The author as submitted", author_ref.clone()),
                        "400": error_response("Body is not JSON"),
                        "422": error_response("Missing or mistyped field")
                    }
                }
            },
            "/authors/{id}": {
                "get": {
                    "summary": "Get an author",
                    "tags": ["Catalog"],
                    "parameters": [id_param("Author identifier")],
                    "responses": {
                        "200": json_response("The stored author", author_ref.clone()),
                        "404": error_response("No author with this identifier")
                    }
                }
            },
            "/reset_data": {
                "post": {
                    "summary": "Replace the catalog with the configured seed data",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": json_response("Reset acknowledgement", json!({ "$ref": "#/components/schemas/ResetSummary" })),
                        "500": error_response("Seed could not be loaded or stored")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Catalog health check",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
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
                        "id": { "type": "string", "description": "Caller-supplied unique identifier" },
                        "title": { "type": "string" },
                        "author_id": { "type": "string", "description": "Identifier of the author; not checked" },
                        "description": { "type": "string" },
                        "pages": { "type": "integer", "minimum": 0 },
                        "language": { "type": "string" },
                        "genre": { "type": "string" }
                    },
                    "required": ["id", "title", "author_id", "description", "pages", "language", "genre"]
                },
                "Author": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "description": "Caller-supplied unique identifier" },
                        "name": { "type": "string" }
                    },
                    "required": ["id", "name"]
                },
                "ResetSummary": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" },
                        "authors": { "type": "integer" },
                        "books": { "type": "integer" }
                    },
                    "required": ["message", "authors", "books"]
                }
            }
        }
    })
}

/// Create the catalog module over a shared store
pub fn create_module(store: SqliteStore, seed: SeedSource) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(store, seed))
}
