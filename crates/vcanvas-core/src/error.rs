//! Error handling for VCanvas
//!
//! Contract violations raised by collections, the object model and the
//! history engine. These indicate a caller bug and are not expected to be
//! handled by normal control flow. Soft conditions (history overflow,
//! empty hit-tests, commands targeting missing objects) never produce an
//! error.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Canvas contract error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// Index outside `0..len` (or `0..=len` for insertion)
    #[error("Index {index} is out of range for collection of length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The collection length at the time of the call.
        len: usize,
    },

    /// Item already belongs to a collection
    #[error("Item '{id}' already belongs to '{owner}'")]
    ItemAlreadyOwned {
        /// The unique id of the item.
        id: String,
        /// The unique id of the current owner.
        owner: String,
    },

    /// Item could not be found
    #[error("Item '{id}' not found")]
    ItemNotFound {
        /// The unique id that was looked up.
        id: String,
    },

    /// Command could not be applied
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Serialized state could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CanvasError {
    /// Shorthand for [`CanvasError::ItemNotFound`].
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    /// Returns true for the error kinds that indicate a broken caller contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::ItemAlreadyOwned { .. } | Self::InvalidCommand(_)
        )
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for canvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_error_display() {
        let err = CanvasError::IndexOutOfRange { index: 5, len: 2 };
        assert_eq!(
            err.to_string(),
            "Index 5 is out of range for collection of length 2"
        );

        let err = CanvasError::ItemAlreadyOwned {
            id: "v1".to_string(),
            owner: "layer-a".to_string(),
        };
        assert_eq!(err.to_string(), "Item 'v1' already belongs to 'layer-a'");

        let err = CanvasError::not_found("v2");
        assert_eq!(err.to_string(), "Item 'v2' not found");
    }

    #[test]
    fn test_contract_violation_kinds() {
        assert!(CanvasError::IndexOutOfRange { index: 0, len: 0 }.is_contract_violation());
        assert!(CanvasError::InvalidCommand("x".into()).is_contract_violation());
        assert!(!CanvasError::not_found("x").is_contract_violation());
        assert!(!CanvasError::Serialization("x".into()).is_contract_violation());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: CanvasError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, CanvasError::Serialization(_)));
    }
}
