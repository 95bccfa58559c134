//! Error types for timestamp parsing.

use thiserror::Error;

/// Why a timestamp token could not be converted to seconds.
///
/// The line parser never surfaces these to callers; malformed tokens become
/// `0` seconds. The strict [`parse_timestamp`](super::parse_timestamp) API
/// returns them for callers that want the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// Nothing to parse
    #[error("empty timestamp token")]
    Empty,

    /// More than `H:MM:SS`
    #[error("timestamp '{token}' has {parts} components\n  Suggestion: use H:MM:SS, MM:SS or SS")]
    TooManyParts {
        /// The offending token
        token: String,
        /// Number of colon-separated components found
        parts: usize,
    },

    /// A component is empty or not made of ASCII digits
    #[error("timestamp '{token}' has invalid component '{component}'")]
    InvalidComponent {
        /// The offending token
        token: String,
        /// The component that failed
        component: String,
    },

    /// Value does not fit in `u32` seconds
    #[error("timestamp '{token}' is out of range")]
    Overflow {
        /// The offending token
        token: String,
    },
}

impl TimestampError {
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub fn too_many_parts(token: &str, parts: usize) -> Self {
        Self::TooManyParts {
            token: token.to_string(),
            parts,
        }
    }

    #[must_use]
    pub fn invalid_component(token: &str, component: &str) -> Self {
        Self::InvalidComponent {
            token: token.to_string(),
            component: component.to_string(),
        }
    }

    #[must_use]
    pub fn overflow(token: &str) -> Self {
        Self::Overflow {
            token: token.to_string(),
        }
    }
}
