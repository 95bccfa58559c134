//! Line parsing for embedded tracklists.
//!
//! Turns normalized text into validated [`Candidate`]s. Each line is trimmed,
//! filtered (length floor, noise headers), and tested against the ordered
//! [`LINE_PATTERNS`]; at most one candidate comes out of a line.
//!
//! # Example
//!
//! ```
//! use tracklist_core::parser::{ParseOptions, parse_tracklist};
//!
//! let outcome = parse_tracklist(
//!     "Tracklist:\n00:00 - Artist A - Song A\n03:25 - Artist B - Song B",
//!     &ParseOptions::description(),
//! );
//! assert_eq!(outcome.len(), 2);
//! assert_eq!(outcome.candidates[1].seconds, Some(205));
//! ```

mod error;
mod input;
mod patterns;
mod timestamp;

pub use error::TimestampError;
pub use input::{DEFAULT_MIN_LINE_LENGTH, ParseOptions, ParseOutcome};
pub use patterns::{LINE_PATTERNS, LineMatch, LinePattern, PatternKind, is_timestamp_token, match_line};
pub use timestamp::{parse_timestamp, timestamp_to_seconds};

use tracing::{debug, trace};

use crate::model::Candidate;
use crate::utils::collapse_whitespace;
use crate::validate::validate;

/// Header words that mark a line as noise rather than a track.
pub const NOISE_WORDS: [&str; 6] = [
    "tracklist",
    "setlist",
    "credits",
    "follow",
    "subscribe",
    "listen",
];

/// Parses normalized text into validated candidates.
///
/// `track_number` is a running counter that only advances on a match that
/// also passes validation, so accepted candidates are numbered 1..N in
/// discovery order.
#[tracing::instrument(skip(text, options), fields(source = %options.source_ref, text_len = text.len()))]
#[must_use]
pub fn parse_tracklist(text: &str, options: &ParseOptions) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    if text.trim().is_empty() {
        debug!("empty text");
        return outcome;
    }

    let mut track_number: u32 = 0;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        outcome.lines_scanned += 1;

        if line.chars().count() < options.min_line_length || is_noise_line(line) {
            outcome.lines_skipped += 1;
            continue;
        }

        let Some(matched) = match_line(line) else {
            outcome.no_match += 1;
            trace!(line, "no pattern matched");
            continue;
        };

        let artist = clean_field(&matched.artist);
        let title = clean_field(&matched.title);
        let seconds = matched.timestamp_text.as_deref().map(timestamp_to_seconds);

        let candidate = Candidate {
            raw_line: line.to_string(),
            timestamp_text: matched.timestamp_text,
            seconds,
            artist,
            title,
            source_type: options.source_type,
            source_ref: options.source_ref.clone(),
            track_number: track_number + 1,
        };

        match validate(candidate) {
            Ok(validated) => {
                track_number += 1;
                trace!(
                    kind = %matched.kind,
                    track_number,
                    artist = %validated.artist,
                    title = %validated.title,
                    "candidate accepted"
                );
                outcome.candidates.push(validated);
            }
            Err(reason) => {
                outcome.rejected += 1;
                debug!(line, kind = %matched.kind, %reason, "candidate rejected");
            }
        }
    }

    debug!(
        candidates = outcome.candidates.len(),
        lines = outcome.lines_scanned,
        skipped = outcome.lines_skipped,
        no_match = outcome.no_match,
        rejected = outcome.rejected,
        "parsing complete"
    );

    outcome
}

/// Returns true if the line opens with a noise header word (`Tracklist:`,
/// `Follow me on ...`, `🎵 Listen on Spotify`).
///
/// Lines opening with a digit (timestamps, ordinals) are never noise.
#[must_use]
pub fn is_noise_line(line: &str) -> bool {
    let rest = line.trim_start_matches(|c: char| !c.is_alphanumeric());
    let word: String = rest
        .chars()
        .take_while(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    !word.is_empty() && NOISE_WORDS.contains(&word.as_str())
}

/// Collapses whitespace and a duplicated half (`"그때 나는 그때 나는"`).
fn clean_field(value: &str) -> String {
    let collapsed = collapse_whitespace(value);
    let words: Vec<&str> = collapsed.split(' ').collect();
    if words.len() >= 4 && words.len() % 2 == 0 {
        let (first, second) = words.split_at(words.len() / 2);
        if first == second {
            return first.join(" ");
        }
    }
    collapsed
}
