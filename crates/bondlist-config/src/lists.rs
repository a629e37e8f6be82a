//! Plain-text exclusion lists and emitent comments.
//!
//! Both formats are line oriented: blank lines and lines starting with `#` are
//! ignored, surrounding whitespace is trimmed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Separator between the emitent name and its comment.
pub const COMMENT_SEPARATOR: &str = " -> ";

fn read(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

// ============================================================================
// Blacklist
// ============================================================================

/// A list of substrings; a value is excluded when it contains any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    entries: Vec<String>,
}

impl Blacklist {
    /// Creates a blacklist from entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(Into::into)
                .filter(|e: &String| !e.is_empty())
                .collect(),
        }
    }

    /// Parses one entry per line.
    pub fn parse(text: &str) -> Self {
        Self::new(entries(text).map(|(_, line)| line))
    }

    /// Loads a list file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Ok(Self::parse(&read(path.as_ref())?))
    }

    /// Loads `path` when given, an empty list otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// First entry contained in `value`.
    pub fn matches(&self, value: &str) -> Option<&str> {
        if value.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| value.contains(entry.as_str()))
            .map(String::as_str)
    }

    /// First entry contained in any of `values`.
    pub fn matches_any<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Option<&str> {
        values.into_iter().find_map(|value| self.matches(value))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Free-text comments keyed by emitent name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitentComments {
    comments: HashMap<String, String>,
}

impl EmitentComments {
    /// Parses `emitent -> comment` lines; `origin` names the source in errors.
    pub fn parse(origin: impl Into<PathBuf>, text: &str) -> ConfigResult<Self> {
        let origin = origin.into();
        let mut comments = HashMap::new();
        for (line, content) in entries(text) {
            let parts: Vec<&str> = content.split(COMMENT_SEPARATOR).collect();
            match parts.as_slice() {
                [name, comment] if !name.trim().is_empty() => {
                    comments.insert(name.trim().to_string(), comment.trim().to_string());
                }
                _ => {
                    return Err(ConfigError::MalformedLine {
                        path: origin,
                        line,
                        content: content.to_string(),
                    })
                }
            }
        }
        Ok(Self { comments })
    }

    /// Loads a comment file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        Self::parse(path, &read(path)?)
    }

    /// Loads `path` when given, no comments otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Adds or replaces a comment.
    pub fn insert(&mut self, emitent: impl Into<String>, comment: impl Into<String>) {
        self.comments.insert(emitent.into(), comment.into());
    }

    /// Comment for `emitent`.
    pub fn get(&self, emitent: &str) -> Option<&str> {
        self.comments.get(emitent).map(String::as_str)
    }

    /// Number of comments.
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    /// Returns true if there are no comments.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_skips_blank_and_comment_lines() {
        let list = Blacklist::parse("# banks\nСбербанк\n\n  Роснано  \n#RU000\n");
        assert_eq!(list.len(), 2);
        assert_eq!(list.matches("ПАО Сбербанк России"), Some("Сбербанк"));
        assert_eq!(list.matches("Роснано"), Some("Роснано"));
        assert_eq!(list.matches("RU000A0JX0J2"), None);
    }

    #[test]
    fn test_blacklist_ignores_empty_values() {
        let list = Blacklist::new(["RU000"]);
        assert_eq!(list.matches(""), None);
        assert_eq!(list.matches_any(["", "ОФЗ 26207", "RU000A0JS3W6"]), Some("RU000"));
    }

    #[test]
    fn test_comments_parse() {
        let comments = EmitentComments::parse(
            "emitent.comments",
            "# notes\nПАО \"Ромашка\" -> рейтинг BB-\nООО Лютик -> дефолт 2020\n",
        )
        .unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments.get("ПАО \"Ромашка\""), Some("рейтинг BB-"));
        assert_eq!(comments.get("ООО Лютик"), Some("дефолт 2020"));
        assert_eq!(comments.get("Лютик"), None);
    }

    #[test]
    fn test_malformed_comment_line_names_line_number() {
        let err = EmitentComments::parse("c.txt", "A -> b\n\nno separator here\n").unwrap_err();
        match err {
            ConfigError::MalformedLine { path, line, content } => {
                assert_eq!(path, PathBuf::from("c.txt"));
                assert_eq!(line, 3);
                assert_eq!(content, "no separator here");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_double_separator_is_malformed() {
        assert!(EmitentComments::parse("c.txt", "a -> b -> c").is_err());
    }

    #[test]
    fn test_load_without_path_is_empty() {
        assert!(Blacklist::load(None).unwrap().is_empty());
        assert!(EmitentComments::load(None).unwrap().is_empty());
    }
}
