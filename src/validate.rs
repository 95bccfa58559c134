//! Structural sanity checks for parsed candidates.
//!
//! Validation is purely a filter: a candidate is accepted as-is or rejected
//! with a [`RejectReason`]. Nothing is repaired or rewritten here.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{Candidate, ValidatedCandidate};
use crate::utils::compile_static_regex;

/// Minimum accepted length (in chars) for artist and title.
pub const MIN_FIELD_LEN: usize = 2;

/// Maximum accepted length (in chars) for artist and title.
pub const MAX_FIELD_LEN: usize = 100;

/// Generic placeholders such as `Track`, `track 3`, `Song #12`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)^(?:track|song)\s*(?:#\s*)?\d*$"));

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("artist length {len} outside [{MIN_FIELD_LEN}, {MAX_FIELD_LEN}]")]
    ArtistLength { len: usize },

    #[error("title length {len} outside [{MIN_FIELD_LEN}, {MAX_FIELD_LEN}]")]
    TitleLength { len: usize },

    #[error("title is purely numeric")]
    NumericTitle,

    #[error("title looks like a URL")]
    UrlTitle,

    #[error("artist looks like a URL")]
    UrlArtist,

    #[error("artist is a generic placeholder")]
    PlaceholderArtist,

    #[error("title is a generic placeholder")]
    PlaceholderTitle,
}

/// Checks an `(artist, title)` pair against the structural rules.
///
/// # Errors
///
/// Returns the first [`RejectReason`] that applies, checked in this order:
/// lengths, numeric title, URL title/artist, placeholders.
pub fn validate_fields(artist: &str, title: &str) -> Result<(), RejectReason> {
    let artist = artist.trim();
    let title = title.trim();

    let artist_len = artist.chars().count();
    if !(MIN_FIELD_LEN..=MAX_FIELD_LEN).contains(&artist_len) {
        return Err(RejectReason::ArtistLength { len: artist_len });
    }
    let title_len = title.chars().count();
    if !(MIN_FIELD_LEN..=MAX_FIELD_LEN).contains(&title_len) {
        return Err(RejectReason::TitleLength { len: title_len });
    }

    if title.chars().all(|c| c.is_ascii_digit()) {
        return Err(RejectReason::NumericTitle);
    }
    if starts_with_http(title) {
        return Err(RejectReason::UrlTitle);
    }
    if starts_with_http(artist) {
        return Err(RejectReason::UrlArtist);
    }

    if PLACEHOLDER_RE.is_match(artist) {
        return Err(RejectReason::PlaceholderArtist);
    }
    if PLACEHOLDER_RE.is_match(title) {
        return Err(RejectReason::PlaceholderTitle);
    }

    Ok(())
}

/// Validates a candidate, wrapping it on success.
///
/// # Errors
///
/// Returns the [`RejectReason`] from [`validate_fields`].
pub fn validate(candidate: Candidate) -> Result<ValidatedCandidate, RejectReason> {
    validate_fields(&candidate.artist, &candidate.title)?;
    Ok(ValidatedCandidate::new(candidate))
}

fn starts_with_http(value: &str) -> bool {
    value
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("http"))
}
