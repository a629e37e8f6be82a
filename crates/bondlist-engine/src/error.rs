//! Engine error types.

use bondlist_config::ConfigError;
use bondlist_sources::SourceError;
use thiserror::Error;

/// Engine operation result type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A mandatory source failed to download or parse.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration or list file error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The pipeline was built without a required component.
    #[error("pipeline not configured: {0} missing")]
    NotConfigured(&'static str),

    /// A detail worker panicked or was cancelled.
    #[error("detail worker failed: {0}")]
    Worker(String),
}
