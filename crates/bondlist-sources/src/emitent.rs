//! Exchange securities directory: maps trade codes to issuers.
//!
//! The directory is paginated (`start=<offset>`) and fetched until an empty page.
//! A JSON cache file can stand in for the download.

use std::collections::HashMap;
use std::path::Path;

use bondlist_core::types::EmitentInfo;
use bondlist_traits::{DocumentFetcher, FetchRequest};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{SourceError, SourceResult};

const SOURCE: &str = "emitents";

/// Requested directory columns, in response order.
pub const COLUMNS: [&str; 4] = ["secid", "type", "emitent_title", "emitent_inn"];

/// Upper bound on pages requested in one download.
pub const MAX_PAGES: usize = 2_000;

/// Issuers keyed by trade code.
pub type EmitentDirectory = HashMap<String, EmitentInfo>;

#[derive(Debug, Deserialize)]
struct Page {
    securities: Block,
}

#[derive(Debug, Deserialize)]
struct Block {
    data: Vec<Vec<Value>>,
}

/// URL of the page starting at `offset`.
pub fn page_url(offset: usize) -> String {
    format!(
        "https://iss.moex.com/iss/securities.json?engine=stock&market=bonds&iss.meta=off&securities.columns={}&start={offset}",
        COLUMNS.join(",")
    )
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses one page into `(trade code, issuer)` pairs.
///
/// A row whose width differs from [`COLUMNS`] is a schema-drift error.
pub fn parse_page(text: &str) -> SourceResult<Vec<(String, EmitentInfo)>> {
    let page: Page = serde_json::from_str(text)?;
    page.securities
        .data
        .iter()
        .map(|row| match row.as_slice() {
            [secid, kind, title, inn] => Ok((
                cell(secid),
                EmitentInfo {
                    kind: cell(kind),
                    title: cell(title),
                    inn: cell(inn),
                },
            )),
            _ => Err(SourceError::RowWidth {
                source_name: SOURCE.to_string(),
                expected: COLUMNS.len(),
                actual: row.len(),
            }),
        })
        .collect()
}

/// Downloads the whole directory page by page.
pub async fn fetch_emitents<F: DocumentFetcher + ?Sized>(fetcher: &F) -> SourceResult<EmitentDirectory> {
    let mut directory = EmitentDirectory::new();
    let mut offset = 0;
    for _ in 0..MAX_PAGES {
        let text = fetcher.fetch(&FetchRequest::new(page_url(offset))).await?;
        let rows = parse_page(&text)?;
        if rows.is_empty() {
            info!(emitents = directory.len(), "downloaded emitent directory");
            return Ok(directory);
        }
        offset += rows.len();
        directory.extend(rows);
    }
    warn!(pages = MAX_PAGES, "emitent directory did not end, keeping what was read");
    Ok(directory)
}

/// Loads the directory from `cache` when it holds a readable copy, otherwise
/// downloads it and writes the cache.
pub async fn load_emitents<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    cache: Option<&Path>,
) -> SourceResult<EmitentDirectory> {
    if let Some(path) = cache {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => match serde_json::from_str::<EmitentDirectory>(&text) {
                Ok(directory) => {
                    info!(path = %path.display(), emitents = directory.len(), "loaded emitent cache");
                    return Ok(directory);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "emitent cache unreadable, downloading"),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "emitent cache unreadable, downloading"),
        }
    }

    let directory = fetch_emitents(fetcher).await?;
    if let Some(path) = cache {
        let json = serde_json::to_string(&directory)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| SourceError::Cache {
                path: path.to_path_buf(),
                source,
            })?;
    }
    Ok(directory)
}
