//! Types flowing through the extraction pipeline.
//!
//! A [`Candidate`] is created once by the line parser and never mutated. The
//! validator wraps accepted candidates in [`ValidatedCandidate`], the merger
//! rebuilds them with final track numbers, and the resolver turns each one into
//! a [`ResolvedTrack`]. The assembled [`ExtractionResult`] is what callers get.

use std::fmt;

use serde::Serialize;

/// Which kind of text a candidate was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// The media description.
    Description,
    /// A single top comment.
    Comment,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description => write!(f, "description"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

/// An unresolved `(artist, title, timestamp?)` triple taken from one line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The trimmed source line the candidate came from.
    pub raw_line: String,
    /// Timestamp token as written (`03:25`, `1:02:03`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_text: Option<String>,
    /// Timestamp in seconds; present whenever `timestamp_text` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u32>,
    pub artist: String,
    pub title: String,
    pub source_type: SourceType,
    /// Identifies the concrete source (`description`, a comment id, `comment#2`).
    pub source_ref: String,
    /// 1-based position; renumbered densely after the final merge sort.
    pub track_number: u32,
}

impl Candidate {
    /// Returns true if the candidate carries a timestamp.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.seconds.is_some()
    }

    /// Free-text search query used for resolution: `"<artist> <title>"`.
    #[must_use]
    pub fn search_query(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

/// A candidate that passed validation.
///
/// Only the validator and the merger construct this type, so holding one is
/// proof the fields satisfy the structural checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedCandidate(Candidate);

impl ValidatedCandidate {
    pub(crate) fn new(candidate: Candidate) -> Self {
        Self(candidate)
    }

    /// Returns a new validated candidate carrying `track_number`.
    #[must_use]
    pub(crate) fn renumbered(&self, track_number: u32) -> Self {
        Self(Candidate {
            track_number,
            ..self.0.clone()
        })
    }

    /// Borrows the underlying candidate.
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        &self.0
    }

    /// Unwraps into the underlying candidate.
    #[must_use]
    pub fn into_inner(self) -> Candidate {
        self.0
    }
}

impl std::ops::Deref for ValidatedCandidate {
    type Target = Candidate;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Whether a track was matched by the search collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    /// Top search hit found.
    Resolved,
    /// No hit, error, or timeout; `canonical_url` is a search-results link.
    Fallback,
}

/// Coarse classification of a matched video, derived from its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    OfficialMv,
    Audio,
    Live,
    Performance,
    MusicVideo,
}

impl VideoKind {
    /// Classifies a video title by keyword, first match wins.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let lower = title.to_lowercase();
        if lower.contains("official video") || lower.contains("m/v") || lower.contains("mv") {
            Self::OfficialMv
        } else if lower.contains("audio") || lower.contains("오디오") {
            Self::Audio
        } else if lower.contains("live") || lower.contains("라이브") {
            Self::Live
        } else if lower.contains("performance") || lower.contains("퍼포먼스") {
            Self::Performance
        } else {
            Self::MusicVideo
        }
    }
}

/// A validated candidate mapped to a playable reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTrack {
    pub candidate: Candidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub canonical_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_kind: Option<VideoKind>,
    pub resolution_status: ResolutionStatus,
}

impl ResolvedTrack {
    /// Returns true if the track fell back to a search link.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.resolution_status == ResolutionStatus::Fallback
    }
}

/// Which source produced the accepted tracklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractedFrom {
    Description,
    Comments,
    None,
}

impl fmt::Display for ExtractedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description => write!(f, "description"),
            Self::Comments => write!(f, "comments"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Diagnostic counters collected over one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Non-empty lines examined across every scanned source.
    pub lines_scanned: usize,
    /// Lines that matched no pattern.
    pub no_match_lines: usize,
    /// Matches dropped by the validator.
    pub rejected_candidates: usize,
    /// Candidates collapsed into an earlier same-key candidate (winning source only).
    pub duplicates_merged: usize,
    /// Comments parsed before a winner was found (or the list ran out).
    pub comments_scanned: usize,
    pub resolved: usize,
    pub fallbacks: usize,
}

/// Final output of one extraction run. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub source_id: String,
    pub tracks: Vec<ResolvedTrack>,
    pub extracted_from: ExtractedFrom,
    /// The winning comment's reference, when `extracted_from` is `comments`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    pub accepted: bool,
    /// True only when the caller allowed partial results and the deadline fired.
    pub partial: bool,
    pub stats: ExtractionStats,
}

impl ExtractionResult {
    /// Builds the below-threshold outcome: no tracks, not accepted.
    #[must_use]
    pub fn discarded(source_id: impl Into<String>, stats: ExtractionStats) -> Self {
        Self {
            source_id: source_id.into(),
            tracks: Vec::new(),
            extracted_from: ExtractedFrom::None,
            source_ref: None,
            accepted: false,
            partial: false,
            stats,
        }
    }

    /// Number of tracks in the result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Returns true if the result holds no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
