//! In-memory fetcher.

use async_trait::async_trait;
use dashmap::DashMap;

use bondlist_traits::{DocumentFetcher, FetchError, FetchRequest, FetchResult};

/// Serves documents from a URL to body map.
///
/// Unknown URLs fail with [`FetchError::NotFound`]; every request is counted.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: DashMap<String, String>,
    requests: DashMap<String, usize>,
}

impl MemoryFetcher {
    /// Creates an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document, builder style.
    pub fn with_document(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    /// Adds or replaces a document.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<String>) {
        self.documents.insert(url.into(), body.into());
    }

    /// Number of times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests.get(url).map_or(0, |n| *n)
    }

    /// Total number of requests served or refused.
    pub fn total_requests(&self) -> usize {
        self.requests.iter().map(|entry| *entry.value()).sum()
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        *self.requests.entry(request.url.clone()).or_insert(0) += 1;
        self.documents
            .get(&request.url)
            .map(|body| body.clone())
            .ok_or_else(|| FetchError::NotFound {
                url: request.url.clone(),
            })
    }
}
