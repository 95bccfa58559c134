//! Pipeline tunables.
//!
//! Every threshold the pipeline uses lives in [`ExtractionConfig`] with its
//! observed default. Configs can be loaded from TOML; absent keys keep their
//! defaults and unknown keys are rejected.
//!
//! ```toml
//! merge_window_seconds = 10
//! qualifying_threshold = 3
//! max_comments_scanned = 5
//! per_call_timeout_ms = 5000
//! resolution_concurrency = 4
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::merge::{DEFAULT_MERGE_WINDOW_SECONDS, SelectionPolicy};
use crate::parser::DEFAULT_MIN_LINE_LENGTH;
use crate::resolver::{
    DEFAULT_FALLBACK_SEARCH_URL, DEFAULT_PER_CALL_TIMEOUT, DEFAULT_RESOLUTION_CONCURRENCY,
    MAX_RESOLUTION_CONCURRENCY, ResolverOptions,
};

/// Default minimum deduplicated candidates for a source to qualify.
pub const DEFAULT_QUALIFYING_THRESHOLD: usize = 3;

/// Default number of top comments scanned.
pub const DEFAULT_MAX_COMMENTS_SCANNED: usize = 5;

const MAX_COMMENTS_SCANNED: usize = 100;
const MAX_PER_CALL_TIMEOUT_MS: u64 = 120_000;
const MAX_MIN_LINE_LENGTH: usize = 64;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is outside its accepted range
    #[error("invalid {field} value {value}: must be {expected}")]
    OutOfRange {
        /// The config key
        field: &'static str,
        /// The rejected value
        value: String,
        /// Human-readable accepted range
        expected: &'static str,
    },

    /// The config file could not be read
    #[error("cannot read config file '{path}': {reason}\n  Suggestion: Check the --config path")]
    Read {
        /// The file path
        path: String,
        /// The I/O error
        reason: String,
    },

    /// The config file is not valid TOML for this schema
    #[error("invalid config file '{path}': {reason}\n  Suggestion: Check key names and value types")]
    Parse {
        /// The file path
        path: String,
        /// The TOML error
        reason: String,
    },
}

impl ConfigError {
    fn out_of_range(field: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// Tunables for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Same-key candidates strictly closer than this merge.
    pub merge_window_seconds: u32,
    /// Minimum deduplicated candidates for a source to qualify.
    pub qualifying_threshold: usize,
    /// How many top comments are considered.
    pub max_comments_scanned: usize,
    /// Per search/detail call; a timeout counts as zero results.
    pub per_call_timeout_ms: u64,
    /// Lookups in flight.
    pub resolution_concurrency: usize,
    /// Trimmed lines shorter than this are skipped.
    pub min_line_length: usize,
    /// Scan comments even when the description qualifies.
    pub consult_comments_when_description_qualifies: bool,
    /// Prefix of fallback links; the encoded query is appended.
    pub fallback_search_url: String,
    /// Overall budget for resolution.
    pub deadline_ms: Option<u64>,
    /// Return resolved-so-far tracks instead of failing when the deadline fires.
    pub allow_partial_results: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            merge_window_seconds: DEFAULT_MERGE_WINDOW_SECONDS,
            qualifying_threshold: DEFAULT_QUALIFYING_THRESHOLD,
            max_comments_scanned: DEFAULT_MAX_COMMENTS_SCANNED,
            per_call_timeout_ms: u64::try_from(DEFAULT_PER_CALL_TIMEOUT.as_millis()).unwrap_or(5000),
            resolution_concurrency: DEFAULT_RESOLUTION_CONCURRENCY,
            min_line_length: DEFAULT_MIN_LINE_LENGTH,
            consult_comments_when_description_qualifies: false,
            fallback_search_url: DEFAULT_FALLBACK_SEARCH_URL.to_string(),
            deadline_ms: None,
            allow_partial_results: false,
        }
    }
}

impl ExtractionConfig {
    /// Checks every value against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::OutOfRange`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.qualifying_threshold < 1 {
            return Err(ConfigError::out_of_range(
                "qualifying_threshold",
                self.qualifying_threshold,
                "at least 1",
            ));
        }
        if !(1..=MAX_RESOLUTION_CONCURRENCY).contains(&self.resolution_concurrency) {
            return Err(ConfigError::out_of_range(
                "resolution_concurrency",
                self.resolution_concurrency,
                "between 1 and 100",
            ));
        }
        if !(1..=MAX_PER_CALL_TIMEOUT_MS).contains(&self.per_call_timeout_ms) {
            return Err(ConfigError::out_of_range(
                "per_call_timeout_ms",
                self.per_call_timeout_ms,
                "between 1 and 120000",
            ));
        }
        if self.max_comments_scanned > MAX_COMMENTS_SCANNED {
            return Err(ConfigError::out_of_range(
                "max_comments_scanned",
                self.max_comments_scanned,
                "between 0 and 100",
            ));
        }
        if !(1..=MAX_MIN_LINE_LENGTH).contains(&self.min_line_length) {
            return Err(ConfigError::out_of_range(
                "min_line_length",
                self.min_line_length,
                "between 1 and 64",
            ));
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::out_of_range("deadline_ms", 0, "greater than 0"));
        }
        let url_ok = url::Url::parse(&self.fallback_search_url)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https"));
        if !url_ok {
            return Err(ConfigError::out_of_range(
                "fallback_search_url",
                &self.fallback_search_url,
                "an absolute http(s) URL",
            ));
        }
        Ok(())
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, or
    /// a validation error.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// as [`ExtractionConfig::from_toml_str`].
    #[tracing::instrument(fields(path = %path.display()))]
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content, &origin)?;
        debug!(?config, "loaded config file");
        Ok(config)
    }

    #[must_use]
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_millis(self.per_call_timeout_ms)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Options for the [`TrackResolver`](crate::resolver::TrackResolver).
    #[must_use]
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            concurrency: self.resolution_concurrency,
            per_call_timeout: self.per_call_timeout(),
            fallback_search_url: self.fallback_search_url.clone(),
        }
    }

    /// Policy for [`select_source`](crate::merge::select_source).
    #[must_use]
    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            qualifying_threshold: self.qualifying_threshold,
            consult_comments_when_description_qualifies: self
                .consult_comments_when_description_qualifies,
        }
    }
}
