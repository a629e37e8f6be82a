//! Short-name normalization.
//!
//! Sources disagree on spacing and punctuation in short names ("ОФЗ 26207" vs
//! "ОФЗ-26207"), so every name-keyed join goes through [`normalize_short_name`].

/// Uppercases `name` and drops whitespace, `-`, `/` and `.`.
///
/// ```
/// use bondlist_core::normalize::normalize_short_name;
///
/// assert_eq!(normalize_short_name("ОФЗ 26207"), "ОФЗ26207");
/// assert_eq!(normalize_short_name("ofz-26207"), "OFZ26207");
/// ```
pub fn normalize_short_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '/' | '.'))
        .flat_map(char::to_uppercase)
        .collect()
}
