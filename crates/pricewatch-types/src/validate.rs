//! Shape validation for decoded request bodies.
//!
//! Serde rejects missing, mistyped and unknown fields. The checks here cover
//! what the type system cannot: empty keys and names, non-finite prices.
//! `Query.items` is an advisory count and is stored as sent.

use crate::{DeleteItemRequest, DeleteQueryRequest, NewItem, Query, QueryKeys, RenameItemRequest};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// A decoded body that can be checked before it reaches the store.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Reject empty strings. Whitespace is kept as entered and counts as content.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

impl Validate for Query {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("query", &self.query)
    }
}

impl Validate for NewItem {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("query", &self.query)?;
        if !self.price.is_finite() {
            return Err(ValidationError::NotFinite { field: "price" });
        }
        Ok(())
    }
}

impl Validate for DeleteQueryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("id", &self.id)
    }
}

impl Validate for DeleteItemRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Validate for RenameItemRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)
    }
}

impl Validate for QueryKeys {
    fn validate(&self) -> Result<(), ValidationError> {
        for (index, key) in self.0.iter().enumerate() {
            require_non_empty("query key", key).map_err(|e| ValidationError::Element {
                index,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        for (index, element) in self.iter().enumerate() {
            element.validate().map_err(|e| ValidationError::Element {
                index,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item() -> NewItem {
        NewItem {
            name: "Pixel 9".to_string(),
            url: "https://shop.example/p9".to_string(),
            image: String::new(),
            price: 799.0,
            query: "phone".to_string(),
        }
    }

    #[test]
    fn test_query_validation() {
        assert!(Query::new("laptop", 0).validate().is_ok());
        assert_eq!(
            Query::new("", 0).validate(),
            Err(ValidationError::Empty { field: "query" })
        );
    }

    #[test]
    fn test_query_accepts_any_advisory_count_and_spaced_keys() {
        assert!(Query::new("laptop", -1).validate().is_ok());
        assert!(Query::new("  ", 3).validate().is_ok());
    }

    #[test]
    fn test_new_item_validation() {
        assert!(new_item().validate().is_ok());

        let mut item = new_item();
        item.name = String::new();
        assert_eq!(item.validate(), Err(ValidationError::Empty { field: "name" }));

        let mut item = new_item();
        item.price = f64::INFINITY;
        assert_eq!(
            item.validate(),
            Err(ValidationError::NotFinite { field: "price" })
        );
    }

    #[test]
    fn test_rename_requires_name() {
        let req = RenameItemRequest {
            id: 1,
            name: String::new(),
        };
        assert!(req.validate().is_err());

        let req = RenameItemRequest {
            id: 1,
            name: "\t".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_query_keys_reject_empty_entries() {
        assert!(QueryKeys(vec![]).validate().is_ok());
        assert!(QueryKeys(vec!["a".into()]).validate().is_ok());
        let err = QueryKeys(vec!["a".into(), "".into()]).validate().unwrap_err();
        assert_eq!(err.to_string(), "element 1: query key must not be empty");
    }

    #[test]
    fn test_vec_reports_failing_index() {
        let batch = vec![Query::new("a", 1), Query::new("b", 2), Query::new("", 3)];
        let err = batch.validate().unwrap_err();
        assert_eq!(err.to_string(), "element 2: query must not be empty");
    }
}
