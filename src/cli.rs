//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use tracklist_core::ExtractionConfig;

/// Extract a structured tracklist from a mix's description and comments.
///
/// Reads a JSON document `{"description": "...", "topComments": [{"text":
/// "...", "engagementScore": 12.5}]}` from INPUT or stdin (or fetches it from
/// YouTube with --fetch), resolves every track and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "tracklist")]
#[command(author, version, about)]
pub struct Args {
    /// JSON text-source document; `-` or omitted reads stdin
    pub input: Option<PathBuf>,

    /// Identifier of the media item (defaults to the input file stem)
    #[arg(long)]
    pub source_id: Option<String>,

    /// Fetch description and comments for --source-id from YouTube instead of reading INPUT
    #[arg(long, requires = "source_id")]
    pub fetch: bool,

    /// YouTube Data API key
    #[arg(long, env = "YT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Skip search; every track gets a fallback search link
    #[arg(long)]
    pub offline: bool,

    /// TOML config file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Merge window in seconds for near-duplicate tracks
    #[arg(short = 'w', long)]
    pub merge_window: Option<u32>,

    /// Minimum tracks for a source to qualify
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub threshold: Option<u64>,

    /// Number of top comments to scan (0-100)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub max_comments: Option<u8>,

    /// Maximum concurrent lookups (1-100)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Per-lookup timeout in milliseconds (1-120000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=120_000))]
    pub timeout_ms: Option<u64>,

    /// Overall resolution deadline in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline_ms: Option<u64>,

    /// Return the tracks resolved so far when the deadline fires
    #[arg(long)]
    pub allow_partial: bool,

    /// Print compact instead of pretty JSON
    #[arg(long)]
    pub compact: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Applies command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut ExtractionConfig) {
        if let Some(window) = self.merge_window {
            config.merge_window_seconds = window;
        }
        if let Some(threshold) = self.threshold {
            config.qualifying_threshold = usize::try_from(threshold).unwrap_or(usize::MAX);
        }
        if let Some(max_comments) = self.max_comments {
            config.max_comments_scanned = usize::from(max_comments);
        }
        if let Some(concurrency) = self.concurrency {
            config.resolution_concurrency = usize::from(concurrency);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.per_call_timeout_ms = timeout_ms;
        }
        if let Some(deadline_ms) = self.deadline_ms {
            config.deadline_ms = Some(deadline_ms);
        }
        if self.allow_partial {
            config.allow_partial_results = true;
        }
    }

    /// The source id to report: `--source-id`, else the input file stem, else `stdin`.
    #[must_use]
    pub fn resolved_source_id(&self) -> String {
        if let Some(id) = &self.source_id {
            return id.clone();
        }
        self.input
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
            .and_then(|path| path.file_stem())
            .map_or_else(|| "stdin".to_string(), |stem| stem.to_string_lossy().into_owned())
    }
}
