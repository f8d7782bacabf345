use thiserror::Error;

/// Failures surfaced by the books storage and service layers.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book '{0}' not found")]
    NotFound(String),

    #[error("book '{0}' is out of stock")]
    OutOfStock(String),

    #[error("book '{0}' is already at the maximum quantity")]
    QuantityLimit(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
