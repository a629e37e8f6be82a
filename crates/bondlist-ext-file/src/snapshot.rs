//! Snapshot directories: one file per fetched URL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use bondlist_traits::{DocumentFetcher, FetchError, FetchRequest, FetchResult};

const MAX_STEM: usize = 96;

/// File name a URL is stored under.
///
/// The scheme is dropped and every character outside `[A-Za-z0-9.-]` becomes `_`.
/// Long names are cut and suffixed with a hash of the full URL so they stay unique.
pub fn snapshot_file_name(url: &str) -> String {
    let trimmed = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_end_matches('/');
    let stem: String = trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.len() <= MAX_STEM {
        format!("{stem}.txt")
    } else {
        format!("{}_{:016x}.txt", &stem[..MAX_STEM], fnv1a(url.as_bytes()))
    }
}

// 64-bit FNV-1a. File names must stay the same across toolchains so recorded
// snapshots keep replaying; `std::hash` output is not stable between releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Replays documents from a snapshot directory.
#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    dir: PathBuf,
}

impl SnapshotFetcher {
    /// Creates a fetcher reading from `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path a URL is stored under.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(snapshot_file_name(url))
    }

    /// Saves a document for `url`, creating the directory if needed.
    pub async fn save(&self, url: &str, body: &str) -> FetchResult<()> {
        let io = |source| FetchError::Io {
            url: url.to_string(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io)?;
        tokio::fs::write(self.path_for(url), body).await.map_err(io)
    }
}

#[async_trait]
impl DocumentFetcher for SnapshotFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        let path = self.path_for(&request.url);
        debug!(url = %request.url, path = %path.display(), "replaying snapshot");
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(body),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::NotFound {
                url: request.url.clone(),
            }),
            Err(source) => Err(FetchError::Io {
                url: request.url.clone(),
                source,
            }),
        }
    }
}

/// Fetches through `inner` and saves every successful response as a snapshot.
#[derive(Debug, Clone)]
pub struct RecordingFetcher<F> {
    inner: F,
    snapshot: SnapshotFetcher,
}

impl<F> RecordingFetcher<F> {
    /// Wraps `inner`, recording into `dir`.
    pub fn new(inner: F, dir: impl AsRef<Path>) -> Self {
        Self {
            inner,
            snapshot: SnapshotFetcher::new(dir),
        }
    }
}

#[async_trait]
impl<F: DocumentFetcher> DocumentFetcher for RecordingFetcher<F> {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        let body = self.inner.fetch(request).await?;
        self.snapshot.save(&request.url, &body).await?;
        Ok(body)
    }
}
