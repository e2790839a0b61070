use thiserror::Error;

/// Failures surfaced by the stock and ledger operations.
///
/// None of these are retried automatically: every mutating call applies a
/// delta, so a blind retry would apply it twice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A category or central item with this name already exists.
    #[error("{0} already exists")]
    DuplicateName(String),

    /// Referenced category, item, school, student or ledger row is absent.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The change would drive stock negative or out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A dispatch or sale asked for more than is on hand.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// Id prefix mismatch during alumni relabelling.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// The category still owns items and cannot be removed.
    #[error("category {0} still has items")]
    CategoryInUse(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl InventoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_missing_entity() {
        let err = InventoryError::not_found("item", "abc");
        assert_eq!(err.to_string(), "item abc not found");

        let err = InventoryError::InsufficientStock {
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock: requested 5, available 2"
        );
    }
}
