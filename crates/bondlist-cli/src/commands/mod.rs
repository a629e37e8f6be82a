//! CLI command implementations.

pub mod calc;
pub mod scan;

pub use calc::CalcArgs;
pub use scan::ScanArgs;

use chrono::NaiveDate;

use crate::error::{CliError, CliResult};

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}
