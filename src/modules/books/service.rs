use std::sync::Arc;

use super::error::BookError;
use super::models::Book;
use super::repository::BookRepository;

/// Stock-keeping rules layered over a [`BookRepository`].
///
/// By default checkout and return read the row, adjust the copy, and write
/// the new quantity back as two separate statements. Concurrent requests on
/// the same id can lose an update in that mode. With `atomic_stock_updates`
/// each adjustment is a single conditional statement instead.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
    atomic_stock_updates: bool,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>, atomic_stock_updates: bool) -> Self {
        Self {
            repository,
            atomic_stock_updates,
        }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, BookError> {
        self.repository.list_books().await
    }

    pub async fn get_book(&self, id: &str) -> Result<Book, BookError> {
        self.repository.get_book(id).await
    }

    /// Store `book` and hand the submitted value back unchanged.
    pub async fn create_book(&self, book: Book) -> Result<Book, BookError> {
        self.repository.insert_book(&book).await?;
        tracing::info!(book_id = %book.id, quantity = book.quantity, "book created");
        Ok(book)
    }

    /// Take one copy out of stock.
    pub async fn checkout(&self, id: &str) -> Result<Book, BookError> {
        let book = if self.atomic_stock_updates {
            match self.repository.decrement_if_positive(id).await? {
                Some(book) => book,
                // Either the id is unknown or stock is exhausted.
                None => {
                    self.repository.get_book(id).await?;
                    return Err(BookError::OutOfStock(id.to_string()));
                }
            }
        } else {
            let mut book = self.repository.get_book(id).await?;
            if book.quantity <= 0 {
                return Err(BookError::OutOfStock(id.to_string()));
            }
            book.quantity -= 1;
            self.repository
                .update_quantity(&book.id, book.quantity)
                .await?;
            book
        };

        tracing::info!(book_id = %book.id, quantity = book.quantity, "book checked out");
        Ok(book)
    }

    /// Put one copy back into stock. The only ceiling is `i64::MAX`.
    pub async fn return_book(&self, id: &str) -> Result<Book, BookError> {
        let book = if self.atomic_stock_updates {
            match self.repository.increment(id).await? {
                Some(book) => book,
                // Either the id is unknown or the quantity cannot grow.
                None => {
                    self.repository.get_book(id).await?;
                    return Err(BookError::QuantityLimit(id.to_string()));
                }
            }
        } else {
            let mut book = self.repository.get_book(id).await?;
            book.quantity = book
                .quantity
                .checked_add(1)
                .ok_or_else(|| BookError::QuantityLimit(id.to_string()))?;
            self.repository
                .update_quantity(&book.id, book.quantity)
                .await?;
            book
        };

        tracing::info!(book_id = %book.id, quantity = book.quantity, "book returned");
        Ok(book)
    }
}
