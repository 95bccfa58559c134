//! Track resolution: mapping candidates to playable references.
//!
//! # Architecture
//!
//! - [`SearchProvider`] - async trait for "query → top hit" collaborators
//! - [`DetailProvider`] - optional async trait for "id → duration" lookups
//! - [`TrackResolver`] - bounded, failure-isolated resolution of a whole list
//! - [`YouTubeClient`] - YouTube Data API v3 implementation of both traits
//! - [`FallbackOnlySearch`] - search that never finds anything (offline runs)
//!
//! A candidate is never dropped here. Zero results, errors, timeouts and
//! panicking lookups all produce a fallback track whose URL is a search
//! results link for the same query.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracklist_core::resolver::{ResolverOptions, TrackResolver, YouTubeClient};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let youtube = Arc::new(YouTubeClient::new("my-api-key")?);
//! let resolver = TrackResolver::new(youtube.clone(), Some(youtube), ResolverOptions::default());
//! # let _ = resolver;
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod pool;
mod youtube;

pub use error::ResolveError;
pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, HttpTimeouts, build_http_client,
};
pub use pool::{
    DEFAULT_PER_CALL_TIMEOUT, DEFAULT_RESOLUTION_CONCURRENCY, MAX_RESOLUTION_CONCURRENCY,
    ResolutionOutcome, ResolverOptions, TrackResolver,
};
pub use youtube::{YouTubeClient, parse_iso8601_duration};

use async_trait::async_trait;

/// Search-results page used when a track cannot be resolved; the encoded
/// query is appended.
pub const DEFAULT_FALLBACK_SEARCH_URL: &str = "https://www.youtube.com/results?search_query=";

/// Top hit returned by a search collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub external_id: String,
    pub canonical_url: String,
    pub thumbnail_url: Option<String>,
    /// Title of the matched item, used for [`VideoKind`](crate::model::VideoKind) classification.
    pub title: Option<String>,
}

/// Extra facts about a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackDetails {
    pub duration_seconds: Option<u32>,
}

/// Looks up the single best match for a free-text query.
///
/// # Object Safety
///
/// Uses `async_trait` so the pipeline can hold `Arc<dyn SearchProvider>`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the collaborator's name for logs.
    fn name(&self) -> &str;

    /// Returns the top hit, or `None` when nothing matched.
    async fn search(&self, query: &str) -> Result<Option<SearchHit>, ResolveError>;
}

/// Fetches details for a previously found hit.
#[async_trait]
pub trait DetailProvider: Send + Sync {
    /// Returns the collaborator's name for logs.
    fn name(&self) -> &str;

    async fn details(&self, external_id: &str) -> Result<TrackDetails, ResolveError>;
}

/// Search collaborator that never matches; every track becomes a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackOnlySearch;

#[async_trait]
impl SearchProvider for FallbackOnlySearch {
    fn name(&self) -> &'static str {
        "fallback-only"
    }

    async fn search(&self, _query: &str) -> Result<Option<SearchHit>, ResolveError> {
        Ok(None)
    }
}

/// Builds the deterministic fallback link for `query`.
#[must_use]
pub fn fallback_search_link(base_url: &str, query: &str) -> String {
    format!("{base_url}{}", urlencoding::encode(query))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_search_link_encodes_query() {
        assert_eq!(
            fallback_search_link(DEFAULT_FALLBACK_SEARCH_URL, "Daft Punk Veridis Quo"),
            "https://www.youtube.com/results?search_query=Daft%20Punk%20Veridis%20Quo"
        );
        assert_eq!(
            fallback_search_link("https://x.test/?q=", "AC/DC & Co"),
            "https://x.test/?q=AC%2FDC%20%26%20Co"
        );
    }

    #[tokio::test]
    async fn test_fallback_only_search_never_matches() {
        let search = FallbackOnlySearch;
        assert_eq!(search.name(), "fallback-only");
        assert!(search.search("anything").await.unwrap().is_none());
    }
}
