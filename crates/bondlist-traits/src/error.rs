//! Error types for document fetching.

use thiserror::Error;

/// Result of a fetch.
pub type FetchResult<T> = Result<T, FetchError>;

/// Why a document could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error for {url}: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code.
        status: u16,
    },

    /// No document is available for the URL.
    #[error("no document for {url}")]
    NotFound {
        /// Requested URL.
        url: String,
    },

    /// Reading a local document failed.
    #[error("IO error for {url}: {source}")]
    Io {
        /// Requested URL.
        url: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::NotFound { url }
            | FetchError::Io { url, .. } => url,
        }
    }

    /// Creates a transport error.
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        FetchError::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
