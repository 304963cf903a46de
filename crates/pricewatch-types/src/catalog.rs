//! Query and item records.

use serde::{Deserialize, Serialize};

/// A tracked search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Query {
    /// The search term, case-sensitive as entered. Primary key.
    pub query: String,
    /// Advisory count of known items for this term. Caller-supplied.
    pub items: i64,
}

impl Query {
    pub fn new(query: impl Into<String>, items: i64) -> Self {
        Self {
            query: query.into(),
            items,
        }
    }
}

/// A product-like record attached to a query term by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned id.
    pub id: i64,
    pub name: String,
    /// Canonical link to the item.
    pub url: String,
    /// Link to a preview image.
    pub image: String,
    pub price: f64,
    /// Query term this item was found under. Not checked against `queries`.
    pub query: String,
}

/// An item that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewItem {
    pub name: String,
    pub url: String,
    pub image: String,
    pub price: f64,
    pub query: String,
}

impl NewItem {
    /// Attach the id the store assigned.
    pub fn with_id(self, id: i64) -> Item {
        Item {
            id,
            name: self.name,
            url: self.url,
            image: self.image,
            price: self.price,
            query: self.query,
        }
    }
}
