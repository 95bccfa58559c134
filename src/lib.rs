//! Tracklist Core Library
//!
//! Turns the free-form text attached to a mix (a video description and its
//! top comments) into a structured, de-duplicated, ordered tracklist, with
//! each track resolved to a playable reference when possible.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`text`] - Markup stripping, entity decoding, line-break normalization
//! - [`parser`] - Ordered heuristic line patterns and timestamp parsing
//! - [`validate`] - Structural candidate checks
//! - [`merge`] - Near-duplicate collapsing, ordering and source selection
//! - [`resolver`] - Concurrent, failure-isolated search resolution
//! - [`assemble`] - Threshold check and result construction
//! - [`pipeline`] - The [`extract`] entry point
//! - [`source`] - Text source collaborators
//! - [`config`] - Tunables with defaults and TOML loading
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracklist_core::{ExtractionConfig, FallbackOnlySearch, SourceText, extract};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SourceText::new().with_description(
//!     "00:00 - Artist A - Song A\n03:25 - Artist B - Song B\n06:45 - Artist C - Song C",
//! );
//! let result = extract(
//!     "video-id",
//!     &source,
//!     Arc::new(FallbackOnlySearch),
//!     None,
//!     &ExtractionConfig::default(),
//! )
//! .await?;
//! assert!(result.accepted);
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assemble;
pub mod config;
pub mod merge;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod resolver;
pub mod source;
#[cfg(test)]
pub mod test_support;
pub mod text;
pub(crate) mod user_agent;
mod utils;
pub mod validate;

// Re-export commonly used types
pub use config::{ConfigError, ExtractionConfig};
pub use merge::{DEFAULT_MERGE_WINDOW_SECONDS, dedup_candidates};
pub use model::{
    Candidate, ExtractedFrom, ExtractionResult, ExtractionStats, ResolutionStatus, ResolvedTrack,
    SourceType, ValidatedCandidate, VideoKind,
};
pub use parser::{ParseOptions, ParseOutcome, parse_timestamp, parse_tracklist, timestamp_to_seconds};
pub use pipeline::{ExtractError, ExtractionStage, extract};
pub use resolver::{
    DetailProvider, FallbackOnlySearch, ResolveError, ResolverOptions, SearchHit, SearchProvider,
    TrackDetails, TrackResolver, YouTubeClient,
};
pub use source::{Comment, SourceError, SourceText, TextSource};
pub use text::normalize_text;
pub use validate::{RejectReason, validate};
