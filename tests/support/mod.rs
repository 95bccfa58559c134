//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use tracklist_core::{Comment, SourceText};

/// Three timestamped tracks in the common `TIME - ARTIST - TITLE` form.
pub const THREE_TRACK_DESCRIPTION: &str =
    "00:00 - Artist A - Song A\n03:25 - Artist B - Song B\n06:45 - Artist C - Song C";

/// A source whose description has one track and whose top comment has four.
pub fn comment_rescue_source() -> SourceText {
    SourceText::new()
        .with_description("Great session!\n00:00 Solo Artist - Only Song")
        .with_comments(vec![
            Comment::new(
                "Tracklist:<br>0:00 Nils Frahm - Says<br>8:12 Ólafur Arnalds - Saman<br>12:40 Max Richter - On the Nature of Daylight<br>19:05 Jóhann Jóhannsson - Flight from the City",
                320,
            )
            .with_id("Ugx-top"),
            Comment::new("1. Aa - Bb\n2. Cc - Dd\n3. Ee - Ff", 12),
        ])
}
