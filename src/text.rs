//! Text normalization for description and comment bodies.
//!
//! Comment bodies arrive as HTML fragments (`<br>`, `<a href>`), descriptions as
//! plain text with mixed line endings. [`normalize_text`] turns either into plain
//! text with `\n` line breaks that the line parser can split on.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::compile_static_regex;

static BREAK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?i)<\s*br\s*/?\s*>|<\s*/\s*p\s*>"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"<[^<>]*>"));

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"\n(?:[ \t]*\n){3,}"));

/// Entity table; `&amp;` is decoded last so `&amp;lt;` yields `&lt;`, not `<`.
const ENTITIES: [(&str, &str); 7] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&nbsp;", " "),
    ("&amp;", "&"),
];

/// Normalizes raw description/comment text into plain text.
///
/// - line endings (`\r\n`, `\r`) become `\n`
/// - `<br>` and `</p>` become line breaks, every other tag is removed
/// - common HTML entities are decoded
/// - runs of three or more blank lines collapse to a single blank line
///
/// Never fails; malformed markup degrades to best-effort cleaned text.
///
/// # Example
///
/// ```
/// use tracklist_core::text::normalize_text;
///
/// let text = normalize_text("00:00 <b>Artist</b> - Song<br>03:10 Other &amp; Co - Tune");
/// assert_eq!(text, "00:00 Artist - Song\n03:10 Other & Co - Tune");
/// ```
#[must_use]
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = BREAK_TAG_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let decoded = decode_entities(&text);
    // Decoding can surface tag syntax that was escaped in the source.
    let text = TAG_RE.replace_all(&decoded, "");
    BLANK_RUN_RE.replace_all(&text, "\n\n").into_owned()
}

fn decode_entities(text: &str) -> String {
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_tags() {
        let out = normalize_text(r#"<a href="https://x.y/watch?t=10">00:10</a> Artist - Song"#);
        assert_eq!(out, "00:10 Artist - Song");
        assert!(!out.contains('<'));
    }

    #[test]
    fn test_normalize_br_variants_become_newlines() {
        assert_eq!(normalize_text("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
    }

    #[test]
    fn test_normalize_decodes_entities() {
        assert_eq!(
            normalize_text("Simon &amp; Garfunkel &quot;The Boxer&quot; &#39;69 &lt;3"),
            "Simon & Garfunkel \"The Boxer\" '69 <3"
        );
    }

    #[test]
    fn test_normalize_amp_decoded_once() {
        assert_eq!(normalize_text("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_normalize_escaped_tags_do_not_survive() {
        let out = normalize_text("<i>x</i> &lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(out, "x bold");
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n \n\t\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\n\nb", "three blank lines collapse");
        assert_eq!(normalize_text("a\n\n\nb"), "a\n\n\nb", "two blank lines stay");
        assert_eq!(normalize_text("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_normalize_unclosed_angle_bracket_kept() {
        assert_eq!(normalize_text("a < b"), "a < b");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_text(""), "");
    }
}
