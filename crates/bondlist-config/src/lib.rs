//! # Bondlist Config
//!
//! Everything a scan needs besides the fetched documents:
//!
//! - [`ScanConfig`]: bond types, commission, dates, filter thresholds, yield
//!   conventions, enrichment and HTTP settings; loaded from TOML, validated, then
//!   overridden from the command line
//! - [`Blacklist`] and [`EmitentComments`]: the plain-text exclusion and comment lists
//!
//! ## Example
//!
//! ```rust
//! use bondlist_config::{ScanConfig, Validate};
//!
//! let config = ScanConfig::from_toml_str(r#"
//!     bond_types = ["corp", "mun"]
//!     commission_percent = 0.05
//!
//!     [filters]
//!     min_clean_price_percent = 90.0
//!
//!     [filters.yield_floors]
//!     rub = 12.0
//! "#).unwrap();
//!
//! assert!(config.is_valid());
//! assert_eq!(config.filters.yield_floors.usd, 4.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lists;
pub mod scan;

pub use error::{ConfigError, ConfigResult, Validate, ValidationError};
pub use lists::{Blacklist, EmitentComments};
pub use scan::{EnrichmentConfig, FilterConfig, HttpConfig, ListPaths, ScanConfig, YieldFloors};
