use async_trait::async_trait;
use libris_db::{Database, SchemaStatement};
use sqlx::{sqlite::SqliteRow, Row};

use super::error::BookError;
use super::models::Book;

/// DDL for the single table this module owns.
pub const BOOKS_TABLE: SchemaStatement = SchemaStatement {
    id: "001_books",
    sql: r#"
        CREATE TABLE IF NOT EXISTS books (
            id       TEXT PRIMARY KEY,
            title    TEXT NOT NULL,
            author   TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (typeof(quantity) = 'integer')
        );
        "#,
};

/// Persistence operations over the `books` table.
///
/// Every call is a single round trip to the store.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All rows, in whatever order the store returns them.
    async fn list_books(&self) -> Result<Vec<Book>, BookError>;

    async fn get_book(&self, id: &str) -> Result<Book, BookError>;

    /// Fails with [`BookError::Storage`] when the id already exists.
    async fn insert_book(&self, book: &Book) -> Result<(), BookError>;

    /// Overwrite the stored quantity. Updating a missing id is not an error.
    async fn update_quantity(&self, id: &str, quantity: i64) -> Result<(), BookError>;

    /// Decrement in one statement if stock remains; `None` when the id is
    /// missing or the quantity is already zero.
    async fn decrement_if_positive(&self, id: &str) -> Result<Option<Book>, BookError>;

    /// Increment in one statement; `None` when the id is missing or the
    /// quantity is already `i64::MAX`.
    async fn increment(&self, id: &str) -> Result<Option<Book>, BookError>;
}

/// SQLite-backed book repository
#[derive(Clone)]
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn book_from_row(row: &SqliteRow) -> Result<Book, sqlx::Error> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        quantity: row.try_get("quantity")?,
    })
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn list_books(&self) -> Result<Vec<Book>, BookError> {
        let rows = sqlx::query("SELECT id, title, author, quantity FROM books")
            .fetch_all(self.db.pool())
            .await?;

        let books = rows
            .iter()
            .map(book_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    async fn get_book(&self, id: &str) -> Result<Book, BookError> {
        let row = sqlx::query("SELECT id, title, author, quantity FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(row) => Ok(book_from_row(&row)?),
            None => Err(BookError::NotFound(id.to_string())),
        }
    }

    async fn insert_book(&self, book: &Book) -> Result<(), BookError> {
        sqlx::query("INSERT INTO books (id, title, author, quantity) VALUES (?, ?, ?, ?)")
            .bind(&book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.quantity)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn update_quantity(&self, id: &str, quantity: i64) -> Result<(), BookError> {
        sqlx::query("UPDATE books SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn decrement_if_positive(&self, id: &str) -> Result<Option<Book>, BookError> {
        let row = sqlx::query(
            r#"
            UPDATE books SET quantity = quantity - 1
            WHERE id = ? AND quantity > 0
            RETURNING id, title, author, quantity
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(book_from_row).transpose()?)
    }

    async fn increment(&self, id: &str) -> Result<Option<Book>, BookError> {
        let row = sqlx::query(
            r#"
            UPDATE books SET quantity = quantity + 1
            WHERE id = ? AND quantity < 9223372036854775807
            RETURNING id, title, author, quantity
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(book_from_row).transpose()?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) async fn empty_repository() -> SqliteBookRepository {
        let db = Database::in_memory().await.unwrap();
        db.apply_schema(&[("books".to_string(), BOOKS_TABLE)])
            .await
            .unwrap();
        SqliteBookRepository::new(db)
    }

    pub(crate) fn book(id: &str, quantity: i64) -> Book {
        Book {
            id: id.to_string(),
            title: format!("Title {id}"),
            author: format!("Author {id}"),
            quantity,
        }
    }

    #[tokio::test]
    async fn list_on_empty_table_is_empty() {
        let repo = empty_repository().await;
        assert!(repo.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inserted_book_can_be_read_back() {
        let repo = empty_repository().await;
        let dune = book("1", 3);
        repo.insert_book(&dune).await.unwrap();

        assert_eq!(repo.get_book("1").await.unwrap(), dune);
        assert_eq!(repo.list_books().await.unwrap(), vec![dune]);
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let repo = empty_repository().await;
        match repo.get_book("999").await {
            Err(BookError::NotFound(id)) => assert_eq!(id, "999"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_id_is_a_storage_error() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", 1)).await.unwrap();

        let err = repo.insert_book(&book("1", 5)).await.unwrap_err();
        assert!(matches!(err, BookError::Storage(_)));
        assert_eq!(repo.get_book("1").await.unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn update_quantity_on_missing_id_is_a_no_op() {
        let repo = empty_repository().await;
        repo.update_quantity("ghost", 10).await.unwrap();
        assert!(repo.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_quantity_overwrites_stock() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", 3)).await.unwrap();
        repo.update_quantity("1", 7).await.unwrap();
        assert_eq!(repo.get_book("1").await.unwrap().quantity, 7);
    }

    #[tokio::test]
    async fn decrement_stops_at_zero() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", 1)).await.unwrap();

        let updated = repo.decrement_if_positive("1").await.unwrap().unwrap();
        assert_eq!(updated.quantity, 0);
        assert!(repo.decrement_if_positive("1").await.unwrap().is_none());
        assert_eq!(repo.get_book("1").await.unwrap().quantity, 0);
        assert!(repo.decrement_if_positive("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn increment_leaves_maximum_quantity_untouched() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", i64::MAX)).await.unwrap();
        repo.insert_book(&book("2", 4)).await.unwrap();

        assert!(repo.increment("1").await.unwrap().is_none());
        assert_eq!(repo.get_book("1").await.unwrap().quantity, i64::MAX);
        assert_eq!(repo.list_books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn table_rejects_non_integer_quantity() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", i64::MAX)).await.unwrap();

        // SQLite would otherwise promote the overflowing sum to REAL.
        let overflow = sqlx::query("UPDATE books SET quantity = quantity + 1 WHERE id = '1'")
            .execute(repo.db.pool())
            .await;
        assert!(overflow.is_err());
        assert_eq!(repo.get_book("1").await.unwrap().quantity, i64::MAX);
    }

    #[tokio::test]
    async fn increment_returns_updated_row() {
        let repo = empty_repository().await;
        repo.insert_book(&book("1", 0)).await.unwrap();

        assert_eq!(repo.increment("1").await.unwrap().unwrap().quantity, 1);
        assert!(repo.increment("missing").await.unwrap().is_none());
    }
}
