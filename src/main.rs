//! CLI entry point for the tracklist tool.

use std::io::{self, IsTerminal, Read};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};
use tracklist_core::resolver::HttpTimeouts;
use tracklist_core::{
    DetailProvider, ExtractionConfig, FallbackOnlySearch, SearchProvider, SourceText, TextSource,
    YouTubeClient, extract,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    // stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let mut config = match &args.config {
        Some(path) => ExtractionConfig::load_from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let api_key = args
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty());
    let youtube = match api_key {
        Some(key) if !args.offline || args.fetch => {
            let timeouts = HttpTimeouts {
                read: config.per_call_timeout(),
                ..HttpTimeouts::default()
            };
            Some(Arc::new(
                YouTubeClient::with_options(key, "https://www.googleapis.com/youtube/v3", timeouts)
                    .context("building YouTube client")?,
            ))
        }
        _ => None,
    };

    let (search, detail): (Arc<dyn SearchProvider>, Option<Arc<dyn DetailProvider>>) =
        match (&youtube, args.offline) {
            (_, true) => {
                info!("offline mode: every track gets a fallback search link");
                (Arc::new(FallbackOnlySearch) as Arc<dyn SearchProvider>, None)
            }
            (Some(client), false) => (
                Arc::clone(client) as Arc<dyn SearchProvider>,
                Some(Arc::clone(client) as Arc<dyn DetailProvider>),
            ),
            (None, false) => bail!(
                "no YouTube API key\n  Suggestion: pass --api-key, set YT_API_KEY, or run with --offline"
            ),
        };

    let source_id = args.resolved_source_id();
    let text_source: Arc<dyn TextSource> = if args.fetch {
        let Some(client) = youtube else {
            bail!("--fetch needs a YouTube API key\n  Suggestion: pass --api-key or set YT_API_KEY");
        };
        client as Arc<dyn TextSource>
    } else {
        let json = read_input(&args)?;
        Arc::new(SourceText::from_json(&json).context("parsing input JSON")?)
    };

    let result = extract(&source_id, text_source.as_ref(), search, detail, &config).await?;

    let rendered = if args.compact {
        serde_json::to_string(&result)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    println!("{rendered}");

    info!(
        source_id = %result.source_id,
        accepted = result.accepted,
        tracks = result.len(),
        extracted_from = %result.extracted_from,
        "extraction finished"
    );
    Ok(())
}

fn read_input(args: &Args) -> Result<String> {
    match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            if io::stdin().is_terminal() {
                bail!(
                    "no input\n  Suggestion: pass a JSON file or pipe one via stdin, e.g. `tracklist mix.json`"
                );
            }
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}
