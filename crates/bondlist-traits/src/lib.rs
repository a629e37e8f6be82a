//! # Bondlist Traits
//!
//! The transport seam between the source extractors and the outside world.
//!
//! Extractors only ever see a [`DocumentFetcher`]; the HTTP client lives in
//! `bondlist-ext-http` and the in-memory and snapshot fetchers in `bondlist-ext-file`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod fetch;

pub use error::{FetchError, FetchResult};
pub use fetch::{DocumentFetcher, FetchRequest, UTF_8, WINDOWS_1251};
