//! Document fetch contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchResult;

/// Charset label for UTF-8 documents.
pub const UTF_8: &str = "utf-8";

/// Charset label for the Cyrillic Windows code page used by several sources.
pub const WINDOWS_1251: &str = "windows-1251";

/// A document to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    /// Absolute URL.
    pub url: String,
    /// Charset to decode with when the response does not declare one.
    pub charset: &'static str,
}

impl FetchRequest {
    /// A UTF-8 document.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            charset: UTF_8,
        }
    }

    /// A windows-1251 document.
    pub fn windows_1251(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            charset: WINDOWS_1251,
        }
    }
}

/// Fetches a document and returns its decoded text.
///
/// One best-effort attempt per call; implementations do not retry.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches `request.url` and decodes the body.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String>;
}

#[async_trait]
impl<T: DocumentFetcher + ?Sized> DocumentFetcher for Arc<T> {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<String> {
        (**self).fetch(request).await
    }
}
