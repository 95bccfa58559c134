//! Bounded, failure-isolated resolution of a candidate list.
//!
//! # Concurrency Model
//!
//! - Each candidate is resolved in its own task inside a [`JoinSet`]
//! - A semaphore permit gates the lookup, bounding in-flight calls
//! - Results are recombined by original index, never by arrival order
//! - Dropping the future aborts every task still in the set
//!
//! Every failure mode (no hit, error, per-call timeout, task panic) yields a
//! fallback track for that index only.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, instrument, warn};

use crate::model::{Candidate, ResolutionStatus, ResolvedTrack, ValidatedCandidate, VideoKind};

use super::{
    DEFAULT_FALLBACK_SEARCH_URL, DetailProvider, ResolveError, SearchHit, SearchProvider,
    fallback_search_link,
};

/// Default number of lookups in flight.
pub const DEFAULT_RESOLUTION_CONCURRENCY: usize = 4;

/// Upper bound on lookups in flight.
pub const MAX_RESOLUTION_CONCURRENCY: usize = 100;

/// Default per-call timeout; a timed-out call counts as zero results.
pub const DEFAULT_PER_CALL_TIMEOUT: Duration = Duration::from_millis(5000);

/// Tunables for a [`TrackResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Clamped to `1..=MAX_RESOLUTION_CONCURRENCY`.
    pub concurrency: usize,
    pub per_call_timeout: Duration,
    pub fallback_search_url: String,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_RESOLUTION_CONCURRENCY,
            per_call_timeout: DEFAULT_PER_CALL_TIMEOUT,
            fallback_search_url: DEFAULT_FALLBACK_SEARCH_URL.to_string(),
        }
    }
}

/// Resolved tracks in track order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub tracks: Vec<ResolvedTrack>,
    /// False when a deadline cut resolution short; `tracks` then holds only
    /// the subset that finished, still in track order.
    pub complete: bool,
}

impl ResolutionOutcome {
    /// Number of tracks that matched a search hit.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.tracks.iter().filter(|t| !t.is_fallback()).count()
    }

    /// Number of tracks that fell back to a search link.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_fallback()).count()
    }
}

/// Resolves candidates concurrently through the search collaborator.
pub struct TrackResolver {
    search: Arc<dyn SearchProvider>,
    detail: Option<Arc<dyn DetailProvider>>,
    options: Arc<ResolverOptions>,
    semaphore: Arc<Semaphore>,
}

impl std::fmt::Debug for TrackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackResolver")
            .field("search", &self.search.name())
            .field("detail", &self.detail.as_ref().map(|d| d.name().to_string()))
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TrackResolver {
    /// Creates a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        detail: Option<Arc<dyn DetailProvider>>,
        mut options: ResolverOptions,
    ) -> Self {
        options.concurrency = options.concurrency.clamp(1, MAX_RESOLUTION_CONCURRENCY);
        debug!(
            search = search.name(),
            concurrency = options.concurrency,
            timeout_ms = options.per_call_timeout.as_millis(),
            "creating track resolver"
        );
        Self {
            semaphore: Arc::new(Semaphore::new(options.concurrency)),
            search,
            detail,
            options: Arc::new(options),
        }
    }

    /// Returns the effective options.
    #[must_use]
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolves every candidate; output order mirrors input order.
    ///
    /// With a `deadline`, tasks still running when it fires are aborted and
    /// the outcome is marked incomplete.
    #[instrument(skip(self, candidates), fields(count = candidates.len(), search = self.search.name()))]
    pub async fn resolve_all(
        &self,
        candidates: Vec<ValidatedCandidate>,
        deadline: Option<Instant>,
    ) -> ResolutionOutcome {
        let originals: Vec<Candidate> = candidates.into_iter().map(ValidatedCandidate::into_inner).collect();
        let mut slots: Vec<Option<ResolvedTrack>> = vec![None; originals.len()];
        let mut tasks = JoinSet::new();
        let mut index_by_task = HashMap::with_capacity(originals.len());

        for (index, candidate) in originals.iter().enumerate() {
            let search = Arc::clone(&self.search);
            let detail = self.detail.clone();
            let options = Arc::clone(&self.options);
            let semaphore = Arc::clone(&self.semaphore);
            let candidate = candidate.clone();

            let handle = tasks.spawn(async move {
                // Permit is released when the task finishes.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return fallback_track(candidate, &options.fallback_search_url);
                };
                resolve_one(search.as_ref(), detail.as_deref(), candidate, &options).await
            });
            index_by_task.insert(handle.id(), index);
        }

        let mut complete = true;
        loop {
            let joined = match deadline {
                Some(deadline) => {
                    if let Ok(next) = timeout_at(deadline, tasks.join_next_with_id()).await {
                        next
                    } else {
                        warn!(pending = tasks.len(), "resolution deadline reached; aborting lookups");
                        tasks.abort_all();
                        complete = false;
                        break;
                    }
                }
                None => tasks.join_next_with_id().await,
            };
            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((id, track)) => {
                    if let Some(&index) = index_by_task.get(&id) {
                        slots[index] = Some(track);
                    }
                }
                Err(error) => {
                    let Some(&index) = index_by_task.get(&error.id()) else {
                        continue;
                    };
                    warn!(index, error = %error, "resolution task failed; using fallback");
                    slots[index] = Some(fallback_track(
                        originals[index].clone(),
                        &self.options.fallback_search_url,
                    ));
                }
            }
        }

        let outcome = ResolutionOutcome {
            tracks: slots.into_iter().flatten().collect(),
            complete,
        };
        info!(
            resolved = outcome.resolved_count(),
            fallbacks = outcome.fallback_count(),
            complete,
            "resolution complete"
        );
        outcome
    }
}

async fn resolve_one(
    search: &dyn SearchProvider,
    detail: Option<&dyn DetailProvider>,
    candidate: Candidate,
    options: &ResolverOptions,
) -> ResolvedTrack {
    let query = candidate.search_query();

    let hit = match bounded_search(search, &query, options.per_call_timeout).await {
        Ok(Some(hit)) => hit,
        Ok(None) => {
            debug!(%query, "no search results");
            return fallback_track(candidate, &options.fallback_search_url);
        }
        Err(error) => {
            warn!(%query, error = %error, "search failed");
            return fallback_track(candidate, &options.fallback_search_url);
        }
    };

    let duration_seconds = match detail {
        Some(detail) => {
            match timeout(options.per_call_timeout, detail.details(&hit.external_id)).await {
                Ok(Ok(details)) => details.duration_seconds,
                Ok(Err(error)) => {
                    debug!(external_id = %hit.external_id, error = %error, "detail lookup failed");
                    None
                }
                Err(_) => {
                    let error =
                        ResolveError::timeout(&hit.external_id, millis(options.per_call_timeout));
                    debug!(external_id = %hit.external_id, error = %error, "detail lookup failed");
                    None
                }
            }
        }
        None => None,
    };

    resolved_track(candidate, hit, duration_seconds)
}

/// Runs one search under `limit`; running out of time is a [`ResolveError::Timeout`].
async fn bounded_search(
    search: &dyn SearchProvider,
    query: &str,
    limit: Duration,
) -> Result<Option<SearchHit>, ResolveError> {
    timeout(limit, search.search(query))
        .await
        .map_err(|_| ResolveError::timeout(query, millis(limit)))?
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn resolved_track(candidate: Candidate, hit: SearchHit, duration_seconds: Option<u32>) -> ResolvedTrack {
    ResolvedTrack {
        candidate,
        video_kind: Some(hit.title.as_deref().map_or(VideoKind::MusicVideo, VideoKind::from_title)),
        external_id: Some(hit.external_id),
        canonical_url: hit.canonical_url,
        thumbnail_url: hit.thumbnail_url,
        duration_seconds,
        resolution_status: ResolutionStatus::Resolved,
    }
}

fn fallback_track(candidate: Candidate, fallback_search_url: &str) -> ResolvedTrack {
    let canonical_url = fallback_search_link(fallback_search_url, &candidate.search_query());
    ResolvedTrack {
        candidate,
        external_id: None,
        canonical_url,
        thumbnail_url: None,
        duration_seconds: None,
        video_kind: None,
        resolution_status: ResolutionStatus::Fallback,
    }
}
