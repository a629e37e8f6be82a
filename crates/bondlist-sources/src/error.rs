//! Error types for source extraction.

use std::path::PathBuf;

use bondlist_traits::FetchError;
use thiserror::Error;

/// Result of an extraction.
pub type SourceResult<T> = Result<T, SourceError>;

/// Why a source could not be extracted.
///
/// Every variant except [`SourceError::MalformedValue`] on a market table is fatal
/// for the run; see the individual extractors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The document could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A header label differs from the expected one.
    #[error("{source_name}: header changed at column {position}: expected `{expected}`, got `{actual}`")]
    HeaderMismatch {
        /// Source name.
        source_name: String,
        /// Zero-based column index.
        position: usize,
        /// Expected label.
        expected: String,
        /// Label found in the document.
        actual: String,
    },

    /// The header has fewer columns than expected.
    #[error("{source_name}: header changed: expected {expected} columns, got {actual}")]
    HeaderWidth {
        /// Source name.
        source_name: String,
        /// Expected column count.
        expected: usize,
        /// Column count found.
        actual: usize,
    },

    /// A data row has an unexpected number of cells.
    #[error("{source_name}: row width changed: expected {expected} cells, got {actual}")]
    RowWidth {
        /// Source name.
        source_name: String,
        /// Expected cell count.
        expected: usize,
        /// Cell count found.
        actual: usize,
    },

    /// A required element is missing from the document.
    #[error("{source_name}: {element} not found")]
    MissingElement {
        /// Source name.
        source_name: String,
        /// Description of the missing element.
        element: String,
    },

    /// A cell could not be converted to its field type.
    #[error("{source_name}: can't parse {field} from `{value}`")]
    MalformedValue {
        /// Source name.
        source_name: String,
        /// Field being parsed.
        field: &'static str,
        /// Offending text.
        value: String,
    },

    /// The ISIN link of a market table row is missing or malformed.
    #[error("{source_name}: can't extract ISIN: {detail}")]
    Isin {
        /// Source name.
        source_name: String,
        /// What was found instead.
        detail: String,
    },

    /// The listing CSV could not be read.
    #[error("listing CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be decoded.
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The emitent cache file could not be written.
    #[error("emitent cache {path}: {source}")]
    Cache {
        /// Cache file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

impl SourceError {
    /// Creates a missing element error.
    pub fn missing(source_name: impl Into<String>, element: impl Into<String>) -> Self {
        SourceError::MissingElement {
            source_name: source_name.into(),
            element: element.into(),
        }
    }

    /// Creates a malformed value error.
    pub fn malformed(
        source_name: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        SourceError::MalformedValue {
            source_name: source_name.into(),
            field,
            value: value.into(),
        }
    }

    /// True for errors meaning the upstream format drifted.
    pub fn is_schema_drift(&self) -> bool {
        matches!(
            self,
            SourceError::HeaderMismatch { .. }
                | SourceError::HeaderWidth { .. }
                | SourceError::RowWidth { .. }
                | SourceError::MissingElement { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_mismatch_names_position() {
        let err = SourceError::HeaderMismatch {
            source_name: "market/corp".into(),
            position: 4,
            expected: "Погашение".into(),
            actual: "Размещение".into(),
        };
        let text = err.to_string();
        assert!(text.contains("column 4"));
        assert!(text.contains("expected `Погашение`"));
        assert!(text.contains("got `Размещение`"));
        assert!(err.is_schema_drift());
    }
}
