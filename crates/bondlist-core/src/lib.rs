//! # Bondlist Core
//!
//! Core types and calculations shared by every bondlist crate.
//!
//! - **Types**: [`BondRecord`](types::BondRecord), [`BondType`](types::BondType),
//!   [`Currency`](types::Currency), liquidity counters and detail-page facts
//! - **Normalization**: the short-name key used to join sources without an ISIN
//! - **Yields**: tax and commission adjusted yield to maturity (and to offer)
//!
//! ## Example
//!
//! ```rust
//! use bondlist_core::prelude::*;
//! use chrono::NaiveDate;
//!
//! let as_of = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut bond = BondRecord::new("RU000A0TEST1", BondType::Corporate);
//! bond.nominal = 1000.0;
//! bond.coupon_interest = 10.0;
//! bond.clean_price_percent = 95.0;
//! bond.maturity_date = Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
//!
//! let calc = YieldCalculator::new(0.1, as_of, YieldConventions::default());
//! calc.finalize(&mut bond).unwrap();
//! assert!(bond.yield_to_maturity.unwrap() > 10.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::float_cmp)]

pub mod error;
pub mod normalize;
pub mod types;
pub mod yields;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{BondError, BondResult, UndefinedYield};
    pub use crate::normalize::normalize_short_name;
    pub use crate::types::{
        BondRecord, BondType, Currency, DetailInfo, EmitentInfo, Liquidity, AMORTIZATION,
        FIXED_COUPON,
    };
    pub use crate::yields::{compute_yield, YieldCalculator, YieldConventions, YieldMetrics};
}

pub use error::{BondError, BondResult};
