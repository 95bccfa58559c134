//! Options and results for parsing one source's text.

use std::fmt;

use crate::model::{SourceType, ValidatedCandidate};

/// Default floor for trimmed line length; shorter lines are skipped.
pub const DEFAULT_MIN_LINE_LENGTH: usize = 5;

/// Identifies the text being parsed and how strict the line filter is.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub source_type: SourceType,
    /// Stamped onto every candidate (`description`, a comment id, `comment#2`).
    pub source_ref: String,
    /// Lines shorter than this (in chars, after trimming) are skipped.
    pub min_line_length: usize,
}

impl ParseOptions {
    /// Options for parsing a description.
    #[must_use]
    pub fn description() -> Self {
        Self {
            source_type: SourceType::Description,
            source_ref: SourceType::Description.to_string(),
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
        }
    }

    /// Options for parsing one comment identified by `source_ref`.
    #[must_use]
    pub fn comment(source_ref: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::Comment,
            source_ref: source_ref.into(),
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
        }
    }

    /// Overrides the line length floor.
    #[must_use]
    pub fn with_min_line_length(mut self, min_line_length: usize) -> Self {
        self.min_line_length = min_line_length;
        self
    }
}

/// Validated candidates from one source plus diagnostic counters.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Accepted candidates in discovery order, numbered 1..N.
    pub candidates: Vec<ValidatedCandidate>,
    /// Non-empty lines examined.
    pub lines_scanned: usize,
    /// Lines skipped for being too short or a noise header.
    pub lines_skipped: usize,
    /// Lines that matched no pattern.
    pub no_match: usize,
    /// Matches dropped by the validator.
    pub rejected: usize,
}

impl ParseOutcome {
    /// Returns true if no candidates were accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of accepted candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl fmt::Display for ParseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates from {} lines ({} no match, {} rejected)",
            self.candidates.len(),
            self.lines_scanned,
            self.no_match,
            self.rejected
        )
    }
}
