//! Error types for bond records and yield computation.

use thiserror::Error;

/// A specialized Result type for bond operations.
pub type BondResult<T> = Result<T, BondError>;

/// Why a yield could not be computed for a record.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UndefinedYield {
    /// The record carries no maturity date.
    #[error("no maturity date")]
    MissingMaturity,

    /// The redemption date is not after the valuation date.
    #[error("{0} days to redemption")]
    NonPositiveDays(f64),

    /// Clean price plus accrued interest is zero.
    #[error("dirty price is zero")]
    ZeroDirtyPrice,

    /// Face value is zero or negative.
    #[error("nominal is not positive")]
    NonPositiveNominal,
}

/// The main error type for bond operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BondError {
    /// A date string could not be parsed.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A bond type code was not recognized.
    #[error("Unknown bond type: {name}")]
    UnknownBondType {
        /// The rejected code.
        name: String,
    },

    /// Yield is undefined for the given record.
    #[error("Yield undefined for {isin}: {reason}")]
    UndefinedYield {
        /// ISIN of the record.
        isin: String,
        /// What made the yield undefined.
        reason: UndefinedYield,
    },
}

impl BondError {
    /// Creates an invalid date error.
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an undefined yield error.
    pub fn undefined_yield(isin: impl Into<String>, reason: UndefinedYield) -> Self {
        Self::UndefinedYield {
            isin: isin.into(),
            reason,
        }
    }
}
