//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Neither or both of the clean price inputs were given.
    #[error("Give exactly one of --clean-price and --clean-price-percent")]
    CleanPriceInput,

    /// Invalid bond count.
    #[error("Invalid bond count: {0}. Must be at least 1.")]
    InvalidCount(u32),
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
