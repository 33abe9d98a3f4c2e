//! Error types for analytics operations

use std::fmt::Display;
use thiserror::Error;

/// Errors that can occur during analytics operations
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Unknown person or case id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed filter or parameter value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The backing store failed
    #[error("Data access error: {0}")]
    DataAccess(String),
}

/// Wrap a store error
pub(crate) fn data_access<E: Display>(e: E) -> AnalyticsError {
    AnalyticsError::DataAccess(e.to_string())
}
