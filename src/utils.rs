//! Small shared helpers: static regex compilation and whitespace handling.

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Collapses every run of whitespace to a single space and trims the ends.
#[must_use]
pub(crate) fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercases and strips everything but letters, digits and single spaces.
///
/// Used to build dedup keys, so `"Daft Punk!"` and `"daft  punk"` compare equal.
#[must_use]
pub(crate) fn normalize_key(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    collapse_whitespace(&cleaned)
}
