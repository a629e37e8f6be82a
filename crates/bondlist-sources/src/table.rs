//! Schema-validated tabular parsing shared by every source.
//!
//! A [`Layout`] pairs the expected header labels with one [`Role`] per column.
//! [`validate_header`] runs on the first row before any data row is trusted, and
//! [`walk_row`] maps the cells of every following row onto the roles.

use tracing::info;

use crate::error::{SourceError, SourceResult};

/// What a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role<F> {
    /// Ignored column.
    Skip,
    /// Stop reading the row here.
    Last,
    /// Column carrying field `F`.
    Field(F),
}

/// Column layout of one source.
#[derive(Debug)]
pub struct Layout<F: 'static> {
    /// Source name used in errors and summaries.
    pub source: &'static str,
    /// Expected header labels; an empty label matches anything, an empty list skips the check.
    pub header: &'static [&'static str],
    /// One role per column.
    pub roles: &'static [Role<F>],
}

/// Outcome of mapping one row onto a layout.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<F, C> {
    /// Every role was reached; the field cells in column order.
    Complete(Vec<(F, C)>),
    /// The row ran out of cells after `consumed` roles.
    Partial {
        /// Roles consumed before the row ended.
        consumed: usize,
    },
}

/// Checks the header row against `layout.header`.
///
/// Extra trailing columns are accepted; fewer columns or any differing label is a
/// schema-drift error naming the column.
pub fn validate_header<F, S: AsRef<str>>(layout: &Layout<F>, labels: &[S]) -> SourceResult<()> {
    if layout.header.is_empty() {
        return Ok(());
    }
    if labels.len() < layout.header.len() {
        return Err(SourceError::HeaderWidth {
            source_name: layout.source.to_string(),
            expected: layout.header.len(),
            actual: labels.len(),
        });
    }
    for (position, (expected, actual)) in layout.header.iter().zip(labels).enumerate() {
        let actual = actual.as_ref().trim();
        if !expected.is_empty() && actual != *expected {
            return Err(SourceError::HeaderMismatch {
                source_name: layout.source.to_string(),
                position,
                expected: (*expected).to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

/// Maps the cells of a data row onto `roles`.
///
/// Each cell consumes one role. [`Role::Skip`] drops the cell, [`Role::Last`] ends the
/// row early, and cells past the last role are ignored. The row is complete only if
/// every role was consumed.
pub fn walk_row<F: Copy, C>(roles: &[Role<F>], cells: impl IntoIterator<Item = C>) -> RowOutcome<F, C> {
    let mut consumed = 0;
    let mut fields = Vec::new();
    for cell in cells {
        let Some(role) = roles.get(consumed) else {
            break;
        };
        consumed += 1;
        match *role {
            Role::Skip => {}
            Role::Last => break,
            Role::Field(field) => fields.push((field, cell)),
        }
    }
    if consumed == roles.len() {
        RowOutcome::Complete(fields)
    } else {
        RowOutcome::Partial { consumed }
    }
}

/// Drops all whitespace, maps the decimal comma to a dot and strips `%`.
pub fn clean_numeric(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Parses a cleaned float; empty text is zero.
pub fn parse_f64(source: &str, field: &'static str, text: &str) -> SourceResult<f64> {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse()
        .map_err(|_| SourceError::malformed(source, field, text))
}

/// Parses a cleaned unsigned integer; empty text is zero.
pub fn parse_u64(source: &str, field: &'static str, text: &str) -> SourceResult<u64> {
    let cleaned = clean_numeric(text);
    if cleaned.is_empty() {
        return Ok(0);
    }
    cleaned
        .parse()
        .map_err(|_| SourceError::malformed(source, field, text))
}

/// Row counters of one parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Source name.
    pub source: String,
    /// Rows turned into output.
    pub accepted: usize,
    /// Partial or malformed rows skipped.
    pub skipped: usize,
    /// Well-formed rows excluded by the source's own rules.
    pub filtered: usize,
}

impl ParseSummary {
    /// Empty counters for `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Logs the counters.
    pub fn log(&self) {
        info!(
            source = %self.source,
            accepted = self.accepted,
            skipped = self.skipped,
            filtered = self.filtered,
            "parsed source"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Name,
        Price,
    }

    static LAYOUT: Layout<Col> = Layout {
        source: "test",
        header: &["№", "Имя", "", "Цена"],
        roles: &[Role::Skip, Role::Field(Col::Name), Role::Skip, Role::Field(Col::Price)],
    };

    #[test]
    fn test_header_accepts_wildcard_and_extra_columns() {
        validate_header(&LAYOUT, &["№", " Имя ", "anything", "Цена", "extra"]).unwrap();
    }

    #[test]
    fn test_header_mismatch_reports_position() {
        let err = validate_header(&LAYOUT, &["№", "Имя", "", "Доходн"]).unwrap_err();
        match err {
            SourceError::HeaderMismatch {
                position,
                expected,
                actual,
                ..
            } => {
                assert_eq!(position, 3);
                assert_eq!(expected, "Цена");
                assert_eq!(actual, "Доходн");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_too_short() {
        let err = validate_header(&LAYOUT, &["№", "Имя"]).unwrap_err();
        assert!(matches!(
            err,
            SourceError::HeaderWidth {
                expected: 4,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_walk_complete_and_partial() {
        let outcome = walk_row(LAYOUT.roles, ["1", "ОФЗ", "x", "99,5", "ignored"]);
        assert_eq!(
            outcome,
            RowOutcome::Complete(vec![(Col::Name, "ОФЗ"), (Col::Price, "99,5")])
        );

        let outcome = walk_row(LAYOUT.roles, ["1", "ОФЗ"]);
        assert_eq!(outcome, RowOutcome::Partial { consumed: 2 });
    }

    #[test]
    fn test_walk_stops_at_last() {
        let roles = [Role::Field(Col::Name), Role::Last];
        let outcome = walk_row(&roles, ["a", "b", "c"]);
        assert_eq!(outcome, RowOutcome::Complete(vec![(Col::Name, "a")]));
    }

    #[test]
    fn test_numeric_cleanup() {
        assert_eq!(clean_numeric(" 1\u{a0}234,50 %"), "1234.50");
        assert_eq!(parse_f64("test", "price", "99,5").unwrap(), 99.5);
        assert_eq!(parse_f64("test", "price", " ").unwrap(), 0.0);
        assert_eq!(parse_u64("test", "count", "1 200").unwrap(), 1200);
        assert!(matches!(
            parse_f64("test", "price", "n/a"),
            Err(SourceError::MalformedValue { field: "price", .. })
        ));
    }
}
