//! # Bondlist Engine
//!
//! Turns fetched sources into a ranked list of bonds.
//!
//! ## Architecture
//!
//! ```text
//! market tables ─┐
//! listing ───────┼─> merge ─> comments ─> pricing ─> filter 1..6 ─┬─> ranking
//! statistics ────┤                                                │
//! emitents ──────┘                       detail workers ─> filter 7
//! ```
//!
//! - [`merge`]: joins market records with the listing, statistics and emitents
//! - [`pricing`]: prices every record and excludes undefined yields
//! - [`filter`]: the ordered filter cascade
//! - [`enrich`]: detail pages fetched by a bounded worker pool
//! - [`ranking`]: yield descending, deterministic ties
//! - [`pipeline`]: [`ScanPipeline`], the join barrier and the whole sequence

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod enrich;
pub mod error;
pub mod filter;
pub mod merge;
pub mod pipeline;
pub mod pricing;
pub mod ranking;

pub use enrich::EnrichStats;
pub use error::{EngineError, EngineResult};
pub use filter::{FilterPolicy, FilterStats, Stage};
pub use merge::MergeStats;
pub use pipeline::{ScanPipeline, ScanReport};
