//! # AppError
//!
//! Centralized error handling for Rusty-Posts.
//! Every layer speaks this taxonomy; the HTTP layer maps it to status codes.

use thiserror::Error;

/// The primary error type for all rp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Identifier did not resolve to a row (zero rows read or affected)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Malformed or missing client input
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Infrastructure failure (e.g., DB down, SQL error, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for the `NotFound` variant.
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        AppError::NotFound(entity.to_string(), id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(..))
    }
}

/// A specialized Result type for Rusty-Posts logic.
pub type Result<T> = std::result::Result<T, AppError>;
