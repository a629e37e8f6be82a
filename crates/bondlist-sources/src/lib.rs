//! # Bondlist Sources
//!
//! Extractors for the four bond data sources and the optional emitent directory.
//!
//! Every tabular source goes through the same schema-validated parser ([`table`]):
//! the header row is checked against the expected labels before any positional data
//! is trusted, each column is mapped to a [`Role`](table::Role), and rows that end
//! before every role was consumed are skipped and counted.
//!
//! | Module | Source | Keyed by |
//! |---|---|---|
//! | [`listing`] | exchange listing CSV | ISIN and trade code |
//! | [`market`] | per bond type market HTML tables | produces [`BondRecord`](bondlist_core::types::BondRecord)s |
//! | [`statistics`] | T0 / T+ trade statistics over several days | normalized short name |
//! | [`detail`] | bond search and detail pages | ISIN |
//! | [`emitent`] | paginated JSON securities directory | trade code |
//!
//! Documents are obtained through a [`DocumentFetcher`](bondlist_traits::DocumentFetcher),
//! so every extractor can be driven from fixtures.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detail;
pub mod emitent;
pub mod error;
pub mod html;
pub mod listing;
pub mod market;
pub mod statistics;
pub mod table;

pub use error::{SourceError, SourceResult};
pub use listing::{ListingEntry, ListingIndex};
pub use market::MarketTable;
pub use statistics::{StatisticsIndex, TradeStats, TradingMode};
pub use table::ParseSummary;
