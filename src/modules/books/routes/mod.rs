//! HTTP handlers for the books module.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use libris_http::error::AppError;

use super::error::BookError;
use super::models::{Book, StockQuery};
use super::service::BookService;

const MISSING_ID: &str = "missing id query parameter";

/// Decoded query pairs, kept in order so repeated keys resolve to the first.
type QueryPairs = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Routes for listing, creating, and adjusting stock of books.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(get_book))
        .route("/checkout", patch(checkout_book))
        .route("/return", patch(return_book))
        .with_state(service)
}

fn storage_fault(error: BookError) -> AppError {
    AppError::internal(error.to_string())
}

/// Translation shared by checkout and return.
fn stock_error(error: BookError) -> AppError {
    match error {
        BookError::NotFound(_) => AppError::not_found("book not found"),
        BookError::OutOfStock(_) => AppError::bad_request("book out of stock"),
        BookError::QuantityLimit(_) => AppError::bad_request("book quantity limit reached"),
        BookError::Storage(e) => {
            tracing::error!(error = %e, "stock update failed");
            AppError::internal("failed to update book quantity")
        }
    }
}

async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    let books = service.list_books().await.map_err(storage_fault)?;
    Ok(Json(books))
}

async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    match service.get_book(&id).await {
        Ok(book) => Ok(Json(book)),
        Err(BookError::NotFound(_)) => Err(AppError::not_found("books not found")),
        Err(e) => Err(storage_fault(e)),
    }
}

async fn create_book(
    State(service): State<BookService>,
    payload: Result<Json<Book>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let Json(book) = payload?;
    let created = service.create_book(book).await.map_err(storage_fault)?;
    Ok((StatusCode::CREATED, Json(created)))
}

fn requested_id(query: QueryPairs) -> Result<String, AppError> {
    let Query(pairs) = query?;
    StockQuery::from_pairs(pairs)
        .id()
        .map(str::to_string)
        .ok_or_else(|| AppError::bad_request(MISSING_ID))
}

async fn checkout_book(
    State(service): State<BookService>,
    query: QueryPairs,
) -> Result<Json<Book>, AppError> {
    let id = requested_id(query)?;
    let book = service.checkout(&id).await.map_err(stock_error)?;
    Ok(Json(book))
}

async fn return_book(
    State(service): State<BookService>,
    query: QueryPairs,
) -> Result<Json<Book>, AppError> {
    let id = requested_id(query)?;
    let book = service.return_book(&id).await.map_err(stock_error)?;
    Ok(Json(book))
}
