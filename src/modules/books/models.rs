use serde::{Deserialize, Serialize};

/// A title held in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Caller-supplied unique identifier
    pub id: String,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Copies currently available for checkout
    pub quantity: i64,
}

/// Query string accepted by the checkout and return endpoints.
#[derive(Debug, Clone, Default)]
pub struct StockQuery {
    pub id: Option<String>,
}

impl StockQuery {
    /// Build from decoded query pairs. Only the first `id` counts.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let id = pairs
            .into_iter()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value);
        Self { id }
    }

    /// The requested id, treating an empty value as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}
