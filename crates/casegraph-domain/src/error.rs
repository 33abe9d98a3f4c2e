//! Domain validation errors

use thiserror::Error;

/// Errors raised when constructing or parsing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A bounded integer field was outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Inclusive lower bound
        min: i64,
        /// Inclusive upper bound
        max: i64,
        /// Rejected value
        value: i64,
    },

    /// A string did not match any variant of a closed enumeration
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Enumeration name (e.g. "case type")
        kind: &'static str,
        /// Rejected input
        value: String,
    },
}

impl DomainError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        DomainError::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}
