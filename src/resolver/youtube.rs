//! YouTube Data API v3 adapter.
//!
//! One client implements all three collaborator roles: [`SearchProvider`]
//! (top music video for a query), [`DetailProvider`] (duration) and
//! [`TextSource`] (description and relevance-ordered comment threads).
//! A missing API key is a construction error; nothing is ever synthesized
//! when the API cannot be reached.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::source::{Comment, SourceError, TextSource};
use crate::utils::compile_static_regex;

use super::http_client::{HttpTimeouts, build_http_client};
use super::{DetailProvider, ResolveError, SearchHit, SearchProvider, TrackDetails};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const SERVICE: &str = "youtube";

/// YouTube's "Music" video category.
const MUSIC_CATEGORY_ID: &str = "10";

/// Comment threads requested per video.
const COMMENT_THREADS_PER_PAGE: &str = "20";

static ISO8601_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
});

/// Client for the YouTube Data API.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    /// Creates a client against the public API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingApiKey`] for a blank key, or
    /// [`ResolveError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ResolveError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`YouTubeClient::new`].
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        Self::with_options(api_key, base_url, HttpTimeouts::default())
    }

    /// Creates a client with explicit HTTP timeouts.
    ///
    /// # Errors
    ///
    /// Same as [`YouTubeClient::new`].
    #[tracing::instrument(skip_all, fields(base_url))]
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, ResolveError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(ResolveError::missing_api_key(SERVICE));
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        tracing::Span::current().record("base_url", base_url.as_str());

        Ok(Self {
            client: build_http_client(SERVICE, timeouts)?,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&format!("{}/{resource}", self.base_url))
            .map_err(|e| ResolveError::unexpected_response(resource, format!("invalid base URL: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().copied())
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, label: &str) -> Result<T, ResolveError> {
        debug!(resource = url.path(), label, "calling YouTube API");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResolveError::request_failed(label, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), label, "YouTube API error");
            return Err(ResolveError::http_status(label, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ResolveError::unexpected_response(label, e))
    }

    async fn fetch_video(&self, video_id: &str, part: &str) -> Result<Option<VideoItem>, ResolveError> {
        let url = self.endpoint("videos", &[("part", part), ("id", video_id)])?;
        let body: VideosResponse = self.get_json(url, video_id).await?;
        Ok(body.items.into_iter().next())
    }
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchProvider for YouTubeClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn search(&self, query: &str) -> Result<Option<SearchHit>, ResolveError> {
        let url = self.endpoint(
            "search",
            &[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("videoCategoryId", MUSIC_CATEGORY_ID),
                ("maxResults", "1"),
            ],
        )?;
        let body: SearchResponse = self.get_json(url, query).await?;

        let hit = body.items.into_iter().find_map(|item| {
            let video_id = item.id.video_id?;
            let snippet = item.snippet.unwrap_or_default();
            Some(SearchHit {
                canonical_url: format!("{WATCH_URL}{video_id}"),
                external_id: video_id,
                thumbnail_url: snippet.thumbnail_url(),
                title: snippet.title,
            })
        });
        debug!(found = hit.is_some(), "search finished");
        Ok(hit)
    }
}

#[async_trait]
impl DetailProvider for YouTubeClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn details(&self, external_id: &str) -> Result<TrackDetails, ResolveError> {
        let video = self
            .fetch_video(external_id, "contentDetails,snippet")
            .await?
            .ok_or_else(|| ResolveError::unexpected_response(external_id, "video not found"))?;

        let raw = video.content_details.and_then(|d| d.duration);
        let duration_seconds = raw.as_deref().and_then(parse_iso8601_duration);
        if raw.is_some() && duration_seconds.is_none() {
            warn!(external_id, duration = ?raw, "unparseable ISO-8601 duration");
        }
        Ok(TrackDetails { duration_seconds })
    }
}

#[async_trait]
impl TextSource for YouTubeClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn description(&self, source_id: &str) -> Result<String, SourceError> {
        let video = self
            .fetch_video(source_id, "snippet")
            .await
            .map_err(|e| SourceError::unavailable(source_id, "description", e))?
            .ok_or_else(|| SourceError::not_found(source_id))?;
        Ok(video
            .snippet
            .and_then(|s| s.description)
            .unwrap_or_default())
    }

    #[tracing::instrument(skip(self), fields(service = SERVICE))]
    async fn top_comments(&self, source_id: &str) -> Result<Vec<Comment>, SourceError> {
        let url = self
            .endpoint(
                "commentThreads",
                &[
                    ("part", "snippet"),
                    ("videoId", source_id),
                    ("maxResults", COMMENT_THREADS_PER_PAGE),
                    ("order", "relevance"),
                ],
            )
            .map_err(|e| SourceError::unavailable(source_id, "comments", e))?;
        let body: CommentThreadsResponse = self
            .get_json(url, source_id)
            .await
            .map_err(|e| SourceError::unavailable(source_id, "comments", e))?;

        Ok(body
            .items
            .into_iter()
            .map(|thread| {
                let snippet = thread.snippet.top_level_comment.snippet;
                Comment {
                    text: snippet.text_display,
                    engagement_score: snippet.like_count,
                    id: Some(thread.id),
                    author: snippet.author_display_name,
                }
            })
            .collect())
    }
}

/// Converts an ISO-8601 duration (`PT1H2M3S`, `P1DT5M`) to seconds.
///
/// Returns `None` for anything that is not a duration or does not fit in `u32`.
#[must_use]
pub fn parse_iso8601_duration(value: &str) -> Option<u32> {
    let value = value.trim();
    if value == "P" || value.ends_with('T') {
        return None;
    }
    let caps = ISO8601_DURATION_RE.captures(value)?;
    let part = |index: usize| -> Option<u32> {
        caps.get(index).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    part(1)?
        .checked_mul(86_400)?
        .checked_add(part(2)?.checked_mul(3600)?)?
        .checked_add(part(3)?.checked_mul(60)?)?
        .checked_add(part(4)?)
}

// ==================== API response shapes ====================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

impl Snippet {
    fn thumbnail_url(&self) -> Option<String> {
        let thumbnails = self.thumbnails.as_ref()?;
        thumbnails
            .medium
            .as_ref()
            .or(thumbnails.default.as_ref())
            .or(thumbnails.high.as_ref())
            .map(|t| t.url.clone())
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    default: Option<Thumbnail>,
    #[serde(default)]
    medium: Option<Thumbnail>,
    #[serde(default)]
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentThreadsResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentThread {
    id: String,
    snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThreadSnippet {
    top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
struct TopLevelComment {
    snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
    #[serde(default)]
    like_count: f64,
    #[serde(default)]
    author_display_name: Option<String>,
}
