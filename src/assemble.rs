//! Final threshold check and result construction.

use tracing::{debug, info};

use crate::model::{ExtractedFrom, ExtractionResult, ExtractionStats, ResolvedTrack};

/// Everything the assembler needs from earlier stages.
#[derive(Debug, Clone)]
pub struct AssemblyInput {
    pub source_id: String,
    pub extracted_from: ExtractedFrom,
    pub source_ref: Option<String>,
    /// Resolved tracks in track order.
    pub tracks: Vec<ResolvedTrack>,
    /// Resolution was cut short by the deadline.
    pub partial: bool,
    pub stats: ExtractionStats,
}

/// Applies `threshold` to the resolved set and builds the result.
///
/// A non-empty partial result is returned as-is, since the subset is smaller
/// by construction; otherwise fewer than `threshold` tracks means discard.
/// An empty result is never accepted.
#[must_use]
pub fn assemble(input: AssemblyInput, threshold: usize) -> ExtractionResult {
    let mut stats = input.stats;
    stats.resolved = input.tracks.iter().filter(|t| !t.is_fallback()).count();
    stats.fallbacks = input.tracks.len() - stats.resolved;

    let below = if input.partial {
        input.tracks.is_empty()
    } else {
        input.tracks.len() < threshold
    };
    if below {
        debug!(
            source_id = %input.source_id,
            tracks = input.tracks.len(),
            threshold,
            "below threshold after resolution; discarding"
        );
        return ExtractionResult::discarded(input.source_id, stats);
    }

    info!(
        source_id = %input.source_id,
        extracted_from = %input.extracted_from,
        tracks = input.tracks.len(),
        resolved = stats.resolved,
        fallbacks = stats.fallbacks,
        partial = input.partial,
        "tracklist accepted"
    );

    ExtractionResult {
        source_id: input.source_id,
        tracks: input.tracks,
        extracted_from: input.extracted_from,
        source_ref: input.source_ref,
        accepted: true,
        partial: input.partial,
        stats,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Candidate, ResolutionStatus, SourceType};

    fn track(n: u32, status: ResolutionStatus) -> ResolvedTrack {
        ResolvedTrack {
            candidate: Candidate {
                raw_line: format!("Artist {n} - Song {n}"),
                timestamp_text: None,
                seconds: None,
                artist: format!("Artist {n}"),
                title: format!("Song {n}"),
                source_type: SourceType::Description,
                source_ref: "description".to_string(),
                track_number: n,
            },
            external_id: None,
            canonical_url: format!("https://example.test/{n}"),
            thumbnail_url: None,
            duration_seconds: None,
            video_kind: None,
            resolution_status: status,
        }
    }

    fn input(tracks: Vec<ResolvedTrack>, partial: bool) -> AssemblyInput {
        AssemblyInput {
            source_id: "vid".to_string(),
            extracted_from: ExtractedFrom::Description,
            source_ref: Some("description".to_string()),
            tracks,
            partial,
            stats: ExtractionStats::default(),
        }
    }

    #[test]
    fn test_assemble_accepts_at_threshold() {
        let result = assemble(
            input(
                vec![
                    track(1, ResolutionStatus::Resolved),
                    track(2, ResolutionStatus::Fallback),
                    track(3, ResolutionStatus::Resolved),
                ],
                false,
            ),
            3,
        );
        assert!(result.accepted);
        assert_eq!(result.len(), 3);
        assert_eq!(result.extracted_from, ExtractedFrom::Description);
        assert_eq!(result.stats.resolved, 2);
        assert_eq!(result.stats.fallbacks, 1);
    }

    #[test]
    fn test_assemble_discards_below_threshold() {
        let result = assemble(input(vec![track(1, ResolutionStatus::Resolved)], false), 3);
        assert!(!result.accepted);
        assert!(result.is_empty());
        assert_eq!(result.extracted_from, ExtractedFrom::None);
        assert_eq!(result.source_ref, None);
    }

    #[test]
    fn test_assemble_partial_kept_below_threshold() {
        let result = assemble(input(vec![track(2, ResolutionStatus::Resolved)], true), 3);
        assert!(result.accepted);
        assert!(result.partial);
        assert_eq!(result.tracks[0].candidate.track_number, 2);
    }

    #[test]
    fn test_assemble_empty_partial_discarded() {
        let result = assemble(input(Vec::new(), true), 3);
        assert!(!result.accepted);
        assert!(!result.partial);
        assert_eq!(result.extracted_from, ExtractedFrom::None);
    }
}
