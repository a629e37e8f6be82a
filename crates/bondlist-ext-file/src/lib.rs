//! # Bondlist Ext File
//!
//! Document fetchers that never touch the network:
//! - [`MemoryFetcher`]: URL to body map, for tests
//! - [`SnapshotFetcher`]: replays documents saved in a directory
//! - [`RecordingFetcher`]: wraps another fetcher and saves what it fetched as a snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;
mod snapshot;

pub use memory::MemoryFetcher;
pub use snapshot::{snapshot_file_name, RecordingFetcher, SnapshotFetcher};
