//! The `extract` entry point.
//!
//! Drives one media item through
//! `UNSTARTED → NORMALIZING → PARSING → VALIDATING → MERGING → RESOLVING`
//! and ends in `DONE`, `DISCARDED` (clean run below threshold) or `FAILED`
//! (no text obtainable, bad config, or the deadline fired without partial
//! results allowed). Everything before resolution is synchronous and
//! deterministic.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::assemble::{AssemblyInput, assemble};
use crate::config::{ConfigError, ExtractionConfig};
use crate::merge::{MergeOutcome, SourceCandidates, merge_source, select_source};
use crate::model::{ExtractionResult, ExtractionStats, SourceType};
use crate::parser::{ParseOptions, parse_tracklist};
use crate::resolver::{DetailProvider, SearchProvider, TrackResolver};
use crate::source::{SourceError, TextSource, rank_comments};
use crate::text::normalize_text;

/// Lifecycle of one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Unstarted,
    Normalizing,
    Parsing,
    Validating,
    Merging,
    Resolving,
    Done,
    Discarded,
    Failed,
}

impl ExtractionStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "UNSTARTED",
            Self::Normalizing => "NORMALIZING",
            Self::Parsing => "PARSING",
            Self::Validating => "VALIDATING",
            Self::Merging => "MERGING",
            Self::Resolving => "RESOLVING",
            Self::Done => "DONE",
            Self::Discarded => "DISCARDED",
            Self::Failed => "FAILED",
        }
    }

    /// Returns true for `DONE`, `DISCARDED` and `FAILED`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Discarded | Self::Failed)
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end an extraction in `FAILED`.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Neither the description nor the comments could be obtained
    #[error(
        "no text available for '{source_id}': description: {description}; comments: {comments}\n  Suggestion: Check the source id and that the text source is reachable"
    )]
    SourceUnavailable {
        /// The media identifier
        source_id: String,
        /// Why the description failed
        description: String,
        /// Why the comments failed
        comments: String,
    },

    /// The configuration was rejected
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Resolution did not finish before the deadline
    #[error(
        "deadline of {deadline_ms} ms exceeded for '{source_id}' ({resolved} of {total} tracks resolved)\n  Suggestion: Raise deadline_ms or set allow_partial_results"
    )]
    DeadlineExceeded {
        /// The media identifier
        source_id: String,
        /// The configured deadline
        deadline_ms: u64,
        /// Tracks finished before the deadline
        resolved: usize,
        /// Tracks that were being resolved
        total: usize,
    },
}

impl ExtractError {
    fn source_unavailable(source_id: &str, description: &SourceError, comments: &SourceError) -> Self {
        Self::SourceUnavailable {
            source_id: source_id.to_string(),
            description: description.to_string(),
            comments: comments.to_string(),
        }
    }
}

struct StageTracker<'a> {
    source_id: &'a str,
    stage: ExtractionStage,
}

impl<'a> StageTracker<'a> {
    fn new(source_id: &'a str) -> Self {
        Self {
            source_id,
            stage: ExtractionStage::Unstarted,
        }
    }

    fn advance(&mut self, next: ExtractionStage) {
        debug!(source_id = self.source_id, from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }
}

/// Extracts, resolves and assembles the tracklist for `source_id`.
///
/// Comments are only fetched when the description does not qualify on its
/// own (or when the config asks to consult them anyway). A failure of one
/// text part is logged and treated as absent; both failing is fatal.
///
/// Dropping the returned future aborts in-flight lookups.
///
/// # Errors
///
/// Returns [`ExtractError`] for invalid config, when no text is obtainable,
/// or when the deadline fires and partial results are not allowed.
#[instrument(skip(text_source, search, detail, config), fields(text_source = text_source.name(), search = search.name()))]
pub async fn extract(
    source_id: &str,
    text_source: &dyn TextSource,
    search: Arc<dyn SearchProvider>,
    detail: Option<Arc<dyn DetailProvider>>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let mut stage = StageTracker::new(source_id);
    if let Err(error) = config.validate() {
        stage.advance(ExtractionStage::Failed);
        return Err(error.into());
    }
    let deadline = config.deadline().map(|d| Instant::now() + d);
    let mut stats = ExtractionStats::default();

    let description = text_source.description(source_id).await;
    if let Err(error) = &description {
        warn!(source_id, error = %error, "description unavailable");
    }

    stage.advance(ExtractionStage::Normalizing);
    let description_text = description.as_ref().ok().map(|raw| normalize_text(raw));

    stage.advance(ExtractionStage::Parsing);
    let description_candidates = description_text.as_deref().map(|text| SourceCandidates {
        source_ref: SourceType::Description.to_string(),
        merged: parse_and_merge(text, ParseOptions::description(), config, &mut stats),
    });
    stage.advance(ExtractionStage::Validating);
    debug!(
        source_id,
        lines = stats.lines_scanned,
        no_match = stats.no_match_lines,
        rejected = stats.rejected_candidates,
        "description parsed"
    );

    let description_qualifies = description_candidates
        .as_ref()
        .is_some_and(|d| d.merged.qualifies(config.qualifying_threshold));
    let need_comments =
        !description_qualifies || config.consult_comments_when_description_qualifies;

    let comments = if need_comments && config.max_comments_scanned > 0 {
        match text_source.top_comments(source_id).await {
            Ok(comments) => rank_comments(comments, config.max_comments_scanned),
            Err(comments_error) => {
                if let Err(description_error) = &description {
                    stage.advance(ExtractionStage::Failed);
                    return Err(ExtractError::source_unavailable(
                        source_id,
                        description_error,
                        &comments_error,
                    ));
                }
                warn!(source_id, error = %comments_error, "comments unavailable");
                Vec::new()
            }
        }
    } else if let Err(description_error) = &description {
        stage.advance(ExtractionStage::Failed);
        let skipped = SourceError::unavailable(source_id, "comments", "max_comments_scanned is 0");
        return Err(ExtractError::source_unavailable(source_id, description_error, &skipped));
    } else {
        Vec::new()
    };

    stage.advance(ExtractionStage::Merging);
    let ranked = comments.iter().enumerate().map(|(rank, comment)| {
        let source_ref = comment
            .id
            .clone()
            .unwrap_or_else(|| format!("comment#{}", rank + 1));
        let text = normalize_text(&comment.text);
        SourceCandidates {
            merged: parse_and_merge(
                &text,
                ParseOptions::comment(source_ref.as_str()),
                config,
                &mut stats,
            ),
            source_ref,
        }
    });
    let selection = select_source(description_candidates, ranked, config.selection_policy());
    stats.comments_scanned = selection.comments_scanned;

    let Some(selected) = selection.selected else {
        stage.advance(ExtractionStage::Discarded);
        info!(source_id, comments_scanned = stats.comments_scanned, "no source qualified; discarding");
        return Ok(ExtractionResult::discarded(source_id, stats));
    };
    stats.duplicates_merged = selected.merged.duplicates_merged;

    stage.advance(ExtractionStage::Resolving);
    let total = selected.merged.len();
    let resolver = TrackResolver::new(search, detail, config.resolver_options());
    let outcome = resolver.resolve_all(selected.merged.candidates, deadline).await;

    // Nothing resolved before the deadline: there is no partial tracklist to return.
    if !outcome.complete && (!config.allow_partial_results || outcome.tracks.is_empty()) {
        stage.advance(ExtractionStage::Failed);
        return Err(ExtractError::DeadlineExceeded {
            source_id: source_id.to_string(),
            deadline_ms: config.deadline_ms.unwrap_or_default(),
            resolved: outcome.tracks.len(),
            total,
        });
    }

    let result = assemble(
        AssemblyInput {
            source_id: source_id.to_string(),
            extracted_from: selected.extracted_from,
            source_ref: Some(selected.source_ref),
            partial: !outcome.complete,
            tracks: outcome.tracks,
            stats,
        },
        config.qualifying_threshold,
    );
    stage.advance(if result.accepted {
        ExtractionStage::Done
    } else {
        ExtractionStage::Discarded
    });
    Ok(result)
}

fn parse_and_merge(
    text: &str,
    options: ParseOptions,
    config: &ExtractionConfig,
    stats: &mut ExtractionStats,
) -> MergeOutcome {
    let options = options.with_min_line_length(config.min_line_length);
    let parsed = parse_tracklist(text, &options);
    stats.lines_scanned += parsed.lines_scanned;
    stats.no_match_lines += parsed.no_match;
    stats.rejected_candidates += parsed.rejected;
    merge_source(parsed.candidates, config.merge_window_seconds)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::model::ExtractedFrom;
    use crate::resolver::{FallbackOnlySearch, ResolveError, SearchHit};
    use crate::source::{Comment, SourceText};

    struct EchoSearch;

    #[async_trait]
    impl SearchProvider for EchoSearch {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn search(&self, query: &str) -> Result<Option<SearchHit>, ResolveError> {
            let id = query.to_lowercase().replace(' ', "-");
            Ok(Some(SearchHit {
                canonical_url: format!("https://www.youtube.com/watch?v={id}"),
                external_id: id,
                thumbnail_url: None,
                title: None,
            }))
        }
    }

    const THREE_TRACKS: &str =
        "00:00 - Artist A - Song A\n03:25 - Artist B - Song B\n06:45 - Artist C - Song C";

    #[tokio::test]
    async fn test_extract_description_tracklist() {
        let source = SourceText::new().with_description(THREE_TRACKS);
        let result = extract("vid", &source, Arc::new(EchoSearch), None, &ExtractionConfig::default())
            .await
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.extracted_from, ExtractedFrom::Description);
        assert_eq!(result.source_ref.as_deref(), Some("description"));
        let seconds: Vec<_> = result.tracks.iter().map(|t| t.candidate.seconds).collect();
        assert_eq!(seconds, vec![Some(0), Some(205), Some(405)]);
        assert_eq!(result.stats.resolved, 3);
        assert_eq!(result.stats.comments_scanned, 0);
    }

    #[tokio::test]
    async fn test_extract_falls_back_to_comment_with_fallback_links() {
        let source = SourceText::new()
            .with_description("00:00 Lone Artist - Lone Song")
            .with_comments(vec![
                Comment::new("great mix", 100),
                Comment::new("1. Aa - Bb\n2. Cc - Dd\n3. Ee - Ff", 50).with_id("thread-9"),
            ]);
        let result = extract(
            "vid",
            &source,
            Arc::new(FallbackOnlySearch),
            None,
            &ExtractionConfig::default(),
        )
        .await
        .unwrap();
        assert!(result.accepted);
        assert_eq!(result.extracted_from, ExtractedFrom::Comments);
        assert_eq!(result.source_ref.as_deref(), Some("thread-9"));
        assert_eq!(result.stats.comments_scanned, 2);
        assert!(result.tracks.iter().all(|t| t.is_fallback()));
        assert!(result.tracks.iter().all(|t| t.candidate.source_ref == "thread-9"));
    }

    #[tokio::test]
    async fn test_extract_both_sources_unavailable_fails() {
        let err = extract(
            "vid",
            &SourceText::new(),
            Arc::new(EchoSearch),
            None,
            &ExtractionConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_extract_comments_unavailable_degrades() {
        let source = SourceText::new().with_description("just a vlog today");
        let result = extract("vid", &source, Arc::new(EchoSearch), None, &ExtractionConfig::default())
            .await
            .unwrap();
        assert!(!result.accepted);
        assert!(result.tracks.is_empty());
        assert_eq!(result.extracted_from, ExtractedFrom::None);
    }

    #[tokio::test]
    async fn test_extract_invalid_config_fails() {
        let config = ExtractionConfig {
            qualifying_threshold: 0,
            ..ExtractionConfig::default()
        };
        let err = extract("vid", &SourceText::new(), Arc::new(EchoSearch), None, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    struct StalledSearch;

    #[async_trait]
    impl SearchProvider for StalledSearch {
        fn name(&self) -> &'static str {
            "stalled"
        }

        async fn search(&self, _query: &str) -> Result<Option<SearchHit>, ResolveError> {
            tokio::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_extract_partial_with_nothing_resolved_fails() {
        let source = SourceText::new().with_description(THREE_TRACKS);
        let config = ExtractionConfig {
            per_call_timeout_ms: 60_000,
            deadline_ms: Some(50),
            allow_partial_results: true,
            ..ExtractionConfig::default()
        };
        let err = extract("vid", &source, Arc::new(StalledSearch), None, &config)
            .await
            .unwrap_err();
        match err {
            ExtractError::DeadlineExceeded { resolved, total, .. } => {
                assert_eq!(resolved, 0);
                assert_eq!(total, 3);
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ExtractionStage::Resolving.to_string(), "RESOLVING");
        assert!(ExtractionStage::Discarded.is_terminal());
        assert!(!ExtractionStage::Merging.is_terminal());
    }
}
