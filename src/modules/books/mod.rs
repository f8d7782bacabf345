pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_db::Database;
use libris_kernel::{settings::BooksSettings, InitCtx, Module, SchemaStatement};
use serde_json::json;

use repository::SqliteBookRepository;
use service::BookService;

/// Books inventory: listing, creation, checkout, and return
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
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
            atomic_stock_updates = ctx.settings.books.atomic_stock_updates,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let message = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/MessageResponse" }
                    }
                }
            })
        };
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let id_query = json!([{
            "name": "id",
            "in": "query",
            "required": true,
            "schema": { "type": "string" }
        }]);

        Some(json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error("Storage failure")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Book" }
                                }
                            }
                        },
                        "responses": {
                            "201": book("The submitted book"),
                            "400": error("Malformed request body"),
                            "500": error("Storage failure, including duplicate id")
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Get a book by id",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": book("The book"),
                            "404": message("Book not found"),
                            "500": error("Storage failure")
                        }
                    }
                },
                "/checkout": {
                    "patch": {
                        "summary": "Check out one copy",
                        "tags": ["Books"],
                        "parameters": id_query.clone(),
                        "responses": {
                            "200": book("The book with its new quantity"),
                            "400": message("Missing id or out of stock"),
                            "404": message("Book not found"),
                            "500": error("Quantity update failed")
                        }
                    }
                },
                "/return": {
                    "patch": {
                        "summary": "Return one copy",
                        "tags": ["Books"],
                        "parameters": id_query,
                        "responses": {
                            "200": book("The book with its new quantity"),
                            "400": message("Missing id"),
                            "404": message("Book not found"),
                            "500": error("Quantity update failed")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "description": "Unique identifier for the book"
                            },
                            "title": {
                                "type": "string",
                                "description": "Title of the book"
                            },
                            "author": {
                                "type": "string",
                                "description": "Author of the book"
                            },
                            "quantity": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Copies available for checkout"
                            }
                        },
                        "required": ["id", "title", "author", "quantity"]
                    }
                }
            }
        }))
    }

    fn schema(&self) -> Vec<SchemaStatement> {
        vec![repository::BOOKS_TABLE]
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

/// Create the books module backed by `db`
pub fn create_module(db: Database, settings: &BooksSettings) -> Arc<dyn Module> {
    let repository = Arc::new(SqliteBookRepository::new(db));
    Arc::new(BooksModule::new(BookService::new(
        repository,
        settings.atomic_stock_updates,
    )))
}
