//! Source selection, near-duplicate collapsing and final ordering.
//!
//! Candidates from one source are deduplicated by `(title, artist)` key with
//! a timestamp merge window, sorted (timed ascending, then untimed in
//! discovery order) and renumbered 1..N. [`select_source`] then decides
//! which source's list wins: the description when it qualifies on its own,
//! otherwise the first qualifying comment in rank order.

use tracing::{debug, trace};

use crate::model::{Candidate, ExtractedFrom, ValidatedCandidate};
use crate::utils::normalize_key;

/// Default merge window in seconds. Exclusive: timestamps exactly this far
/// apart stay separate.
pub const DEFAULT_MERGE_WINDOW_SECONDS: u32 = 10;

/// Deduplicated, sorted and renumbered candidates from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub candidates: Vec<ValidatedCandidate>,
    /// Candidates folded into an earlier entry.
    pub duplicates_merged: usize,
}

impl MergeOutcome {
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns true if the list meets `threshold`.
    #[must_use]
    pub fn qualifies(&self, threshold: usize) -> bool {
        self.candidates.len() >= threshold
    }
}

/// Dedup key: normalized title, then normalized artist.
#[must_use]
pub fn dedup_key(candidate: &Candidate) -> (String, String) {
    (normalize_key(&candidate.title), normalize_key(&candidate.artist))
}

/// Returns true if two same-key entries may merge under `window`.
///
/// Untimed entries merge with anything; two timed entries merge only when
/// strictly closer than the window.
fn within_window(existing: Option<u32>, incoming: Option<u32>, window: u32) -> bool {
    match (existing, incoming) {
        (Some(a), Some(b)) => a.abs_diff(b) < window,
        _ => true,
    }
}

/// Collapses same-key near-duplicates, keeping first-seen artist and title.
///
/// When a merge happens the surviving entry takes the earliest timestamp of
/// the pair along with the raw line it was read from, so `raw_line` always
/// contains `timestamp_text`. Track numbers are left as-is (see
/// [`sort_and_renumber`]).
#[must_use]
pub fn dedup_candidates(
    candidates: Vec<ValidatedCandidate>,
    merge_window_seconds: u32,
) -> MergeOutcome {
    let mut entries: Vec<((String, String), Candidate)> = Vec::with_capacity(candidates.len());
    let mut duplicates_merged = 0;

    for incoming in candidates {
        let incoming = incoming.into_inner();
        let key = dedup_key(&incoming);

        let existing = entries.iter_mut().find(|(entry_key, entry)| {
            *entry_key == key && within_window(entry.seconds, incoming.seconds, merge_window_seconds)
        });

        match existing {
            Some((_, entry)) => {
                duplicates_merged += 1;
                let earlier = match (entry.seconds, incoming.seconds) {
                    (None, Some(_)) => true,
                    (Some(kept), Some(new)) => new < kept,
                    _ => false,
                };
                if earlier {
                    entry.seconds = incoming.seconds;
                    entry.timestamp_text = incoming.timestamp_text;
                    entry.raw_line = incoming.raw_line;
                }
                trace!(
                    artist = %entry.artist,
                    title = %entry.title,
                    seconds = ?entry.seconds,
                    "merged duplicate candidate"
                );
            }
            None => entries.push((key, incoming)),
        }
    }

    MergeOutcome {
        candidates: entries
            .into_iter()
            .map(|(_, candidate)| ValidatedCandidate::new(candidate))
            .collect(),
        duplicates_merged,
    }
}

/// Sorts timed candidates ascending by seconds ahead of untimed ones, then
/// assigns dense track numbers 1..N.
///
/// The sort is stable, so equal timestamps and all untimed candidates keep
/// discovery order.
#[must_use]
pub fn sort_and_renumber(mut candidates: Vec<ValidatedCandidate>) -> Vec<ValidatedCandidate> {
    candidates.sort_by_key(|c| (c.seconds.is_none(), c.seconds.unwrap_or(0)));
    candidates
        .iter()
        .zip(1u32..)
        .map(|(candidate, number)| candidate.renumbered(number))
        .collect()
}

/// Dedups, sorts and renumbers one source's candidates.
#[must_use]
pub fn merge_source(
    candidates: Vec<ValidatedCandidate>,
    merge_window_seconds: u32,
) -> MergeOutcome {
    let deduped = dedup_candidates(candidates, merge_window_seconds);
    MergeOutcome {
        candidates: sort_and_renumber(deduped.candidates),
        duplicates_merged: deduped.duplicates_merged,
    }
}

/// How sources are weighed against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub qualifying_threshold: usize,
    /// Scan comments even when the description already qualifies; the
    /// qualifying source with the most candidates then wins, description
    /// first on ties.
    pub consult_comments_when_description_qualifies: bool,
}

/// One source's merged candidates, labelled for the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCandidates {
    pub source_ref: String,
    pub merged: MergeOutcome,
}

/// The winning source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSource {
    pub extracted_from: ExtractedFrom,
    pub source_ref: String,
    pub merged: MergeOutcome,
}

/// Outcome of source selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    /// `None` when no source reached the threshold.
    pub selected: Option<SelectedSource>,
    /// Number of comments pulled from the iterator.
    pub comments_scanned: usize,
}

/// Picks the source whose candidates form the result.
///
/// `comments` is consumed lazily in rank order, so with the default policy
/// comments after the first qualifying one are never parsed.
pub fn select_source<I>(
    description: Option<SourceCandidates>,
    comments: I,
    policy: SelectionPolicy,
) -> Selection
where
    I: IntoIterator<Item = SourceCandidates>,
{
    let threshold = policy.qualifying_threshold;
    let mut best: Option<SelectedSource> = description
        .filter(|d| d.merged.qualifies(threshold))
        .map(|d| SelectedSource {
            extracted_from: ExtractedFrom::Description,
            source_ref: d.source_ref,
            merged: d.merged,
        });

    if best.is_some() && !policy.consult_comments_when_description_qualifies {
        debug!("description qualifies; comments not consulted");
        return Selection {
            selected: best,
            comments_scanned: 0,
        };
    }

    let mut comments_scanned = 0;
    for comment in comments {
        comments_scanned += 1;
        if !comment.merged.qualifies(threshold) {
            trace!(source_ref = %comment.source_ref, count = comment.merged.len(), "comment below threshold");
            continue;
        }
        let beats_best = best
            .as_ref()
            .is_none_or(|current| comment.merged.len() > current.merged.len());
        if beats_best {
            debug!(source_ref = %comment.source_ref, count = comment.merged.len(), "comment qualifies");
            best = Some(SelectedSource {
                extracted_from: ExtractedFrom::Comments,
                source_ref: comment.source_ref,
                merged: comment.merged,
            });
        }
        if !policy.consult_comments_when_description_qualifies {
            break;
        }
    }

    Selection {
        selected: best,
        comments_scanned,
    }
}
