//! Timestamp token conversion (`H:MM:SS`, `MM:SS`, bare seconds).

use tracing::warn;

use super::error::TimestampError;

/// Converts a timestamp token to seconds, reporting why a token is malformed.
///
/// - `H:MM:SS` → `H*3600 + MM*60 + SS`
/// - `MM:SS` → `MM*60 + SS`
/// - `SS` → `SS`
///
/// Components are taken at face value (`3:75` is 255 seconds), matching how
/// hand-written tracklists are read elsewhere.
///
/// # Errors
///
/// Returns [`TimestampError`] for empty tokens, more than three components,
/// non-digit components, or values that overflow `u32`.
pub fn parse_timestamp(token: &str) -> Result<u32, TimestampError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TimestampError::empty());
    }

    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::too_many_parts(token, parts.len()));
    }

    let mut total: u32 = 0;
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampError::invalid_component(token, part));
        }
        let value: u32 = part
            .parse()
            .map_err(|_| TimestampError::overflow(token))?;
        total = total
            .checked_mul(60)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| TimestampError::overflow(token))?;
    }
    Ok(total)
}

/// Converts a timestamp token to seconds, yielding `0` for malformed tokens.
///
/// Malformed input is logged and never fatal.
#[must_use]
pub fn timestamp_to_seconds(token: &str) -> u32 {
    match parse_timestamp(token) {
        Ok(seconds) => seconds,
        Err(error) => {
            warn!(token, error = %error, "malformed timestamp, using 0");
            0
        }
    }
}
