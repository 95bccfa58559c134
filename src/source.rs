//! Text sources: where descriptions and comments come from.
//!
//! The pipeline never fetches text itself; it asks a [`TextSource`]. Each of
//! the two parts may fail independently. [`SourceText`] is the in-memory
//! implementation used by the CLI and tests; the YouTube adapter in
//! [`crate::resolver`] fetches live text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One comment with its engagement score (likes, or any caller-defined number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    #[serde(default)]
    pub engagement_score: f64,
    /// Stable id from the platform, used as the candidate `source_ref`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Comment {
    #[must_use]
    pub fn new(text: impl Into<String>, engagement_score: impl Into<f64>) -> Self {
        Self {
            text: text.into(),
            engagement_score: engagement_score.into(),
            id: None,
            author: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Errors from a text source.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// The requested part cannot be obtained
    #[error("{part} unavailable for '{source_id}': {reason}\n  Suggestion: {suggestion}")]
    Unavailable {
        /// The media identifier
        source_id: String,
        /// `description` or `comments`
        part: String,
        /// Why it could not be obtained
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The media item does not exist
    #[error("source '{source_id}' not found\n  Suggestion: Check the video id")]
    NotFound {
        /// The media identifier
        source_id: String,
    },
}

impl SourceError {
    #[must_use]
    pub fn unavailable(source_id: &str, part: &str, reason: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            source_id: source_id.to_string(),
            part: part.to_string(),
            reason: reason.to_string(),
            suggestion: "The source may have disabled this content or the service may be down"
                .to_string(),
        }
    }

    #[must_use]
    pub fn not_found(source_id: &str) -> Self {
        Self::NotFound {
            source_id: source_id.to_string(),
        }
    }
}

/// Supplies the description and top comments for a media item.
///
/// # Object Safety
///
/// Uses `async_trait` so callers can pass `&dyn TextSource`.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Returns the source's name for logs.
    fn name(&self) -> &str;

    async fn description(&self, source_id: &str) -> Result<String, SourceError>;

    /// Comments in any order; the pipeline ranks them by engagement.
    async fn top_comments(&self, source_id: &str) -> Result<Vec<Comment>, SourceError>;
}

/// In-memory text for one media item.
///
/// Deserializes from `{ "description": "...", "topComments": [...] }`;
/// a missing or `null` field means that part is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceText {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub top_comments: Option<Vec<Comment>>,
}

impl SourceText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.top_comments = Some(comments);
        self
    }

    /// Parses the JSON document form.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[async_trait]
impl TextSource for SourceText {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    async fn description(&self, source_id: &str) -> Result<String, SourceError> {
        self.description
            .clone()
            .ok_or_else(|| SourceError::unavailable(source_id, "description", "not supplied"))
    }

    async fn top_comments(&self, source_id: &str) -> Result<Vec<Comment>, SourceError> {
        self.top_comments
            .clone()
            .ok_or_else(|| SourceError::unavailable(source_id, "comments", "not supplied"))
    }
}

/// Orders comments by engagement, highest first, and keeps the top `max`.
///
/// The sort is stable, so ties keep supplier order.
#[must_use]
pub fn rank_comments(mut comments: Vec<Comment>, max: usize) -> Vec<Comment> {
    comments.sort_by(|a, b| b.engagement_score.total_cmp(&a.engagement_score));
    comments.truncate(max);
    comments
}
