//! The ordered list of tracklist line patterns.
//!
//! Every line is tested against [`LINE_PATTERNS`] in order and the first
//! match wins, so precedence lives in exactly one place. Within a timestamped
//! kind the leading form is tried before the trailing form.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::compile_static_regex;

/// `H:MM:SS` or `M:SS`/`MM:SS`.
const TIME: &str = r"\d{1,2}:\d{2}(?::\d{2})?";

/// Artist/title separator. A bare hyphen needs whitespace on both sides so
/// hyphenated names (`Jay-Z`, `K-pop`) are not split; en/em dashes always split.
const SEP: &str = r"(?:\s+-\s+|\s*[–—]\s*)";

/// Separator directly after (or before) a timestamp, where adjacency is unambiguous.
const TIME_SEP: &str = r"\s*[-–—]\s*";

/// Optional list ordinal in front of a timestamped line (`1. 00:00 ...`, `2) A - B (3:25)`).
const ORDINAL: &str = r"(?:\d{1,3}[.)]\s*)?";

static TIME_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(&format!(r"^{TIME}$")));

/// Heuristic line pattern kinds, highest confidence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    /// `TIME SEP TEXT SEP TEXT` (or `TEXT SEP TEXT SEP TIME`)
    TimestampSepSep,
    /// `TIME TEXT SEP TEXT` (or `TEXT SEP TEXT TIME`)
    TimestampSpaceSep,
    /// `N. TEXT SEP TEXT`
    NumberedSep,
    /// `TEXT SEP TEXT`
    PlainSep,
}

impl PatternKind {
    /// Stable snake_case label used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TimestampSepSep => "timestamp_sep_sep",
            Self::TimestampSpaceSep => "timestamp_space_sep",
            Self::NumberedSep => "numbered_sep",
            Self::PlainSep => "plain_sep",
        }
    }

    /// Returns true for kinds whose matches carry a timestamp.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::TimestampSepSep | Self::TimestampSpaceSep)
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compiled entry of the ordered pattern list.
#[derive(Debug)]
pub struct LinePattern {
    pub kind: PatternKind,
    regex: Regex,
}

/// Ordered pattern list; order is the precedence contract.
pub static LINE_PATTERNS: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    let leading_time = format!(r"{ORDINAL}[\[(]?({TIME})[\])]?");
    let trailing_time = format!(r"[\[(]?({TIME})[\])]?");
    vec![
        LinePattern {
            kind: PatternKind::TimestampSepSep,
            regex: compile_static_regex(&format!(r"^{leading_time}{TIME_SEP}(.+?){SEP}(.+)$")),
        },
        LinePattern {
            kind: PatternKind::TimestampSepSep,
            regex: compile_static_regex(&format!(r"^{ORDINAL}(.+?){SEP}(.+?){TIME_SEP}{trailing_time}$")),
        },
        LinePattern {
            kind: PatternKind::TimestampSpaceSep,
            regex: compile_static_regex(&format!(r"^{leading_time}\s+(.+?){SEP}(.+)$")),
        },
        LinePattern {
            kind: PatternKind::TimestampSpaceSep,
            regex: compile_static_regex(&format!(r"^{ORDINAL}(.+?){SEP}(.+?)\s+{trailing_time}$")),
        },
        LinePattern {
            kind: PatternKind::NumberedSep,
            regex: compile_static_regex(&format!(r"^\d{{1,3}}[.)]\s*(.+?){SEP}(.+)$")),
        },
        LinePattern {
            kind: PatternKind::PlainSep,
            regex: compile_static_regex(&format!(r"^(.+?){SEP}(.+)$")),
        },
    ]
});

/// The fields pulled out of a matched line, before cleanup and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub kind: PatternKind,
    pub timestamp_text: Option<String>,
    pub artist: String,
    pub title: String,
}

/// Returns true if `value` is exactly one timestamp token.
#[must_use]
pub fn is_timestamp_token(value: &str) -> bool {
    TIME_ONLY_RE.is_match(value.trim())
}

/// Tests `line` against the ordered patterns and returns the first match.
///
/// Timestamp position is read from the groups: when the last captured group
/// is a timestamp token it is trailing, otherwise a timestamped kind has it
/// in the first group.
#[must_use]
pub fn match_line(line: &str) -> Option<LineMatch> {
    LINE_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.regex.captures(line)?;
        let groups: Vec<&str> = caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str().trim())
            .collect();
        split_groups(pattern.kind, &groups)
    })
}

fn split_groups(kind: PatternKind, groups: &[&str]) -> Option<LineMatch> {
    let (timestamp_text, artist, title) = match groups {
        [first, second, last] if is_timestamp_token(last) && !is_timestamp_token(first) => {
            (Some((*last).to_string()), *first, *second)
        }
        [first, second, third] => (Some((*first).to_string()), *second, *third),
        [artist, title] => (None, *artist, *title),
        _ => return None,
    };
    Some(LineMatch {
        kind,
        timestamp_text,
        artist: artist.to_string(),
        title: title.to_string(),
    })
}
