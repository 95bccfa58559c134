//! Error types for track resolution.
//!
//! None of these ever reach the caller of the pipeline: every failure is
//! turned into a per-track fallback. They exist so collaborators can say why
//! a lookup failed and the resolver can log it.

use thiserror::Error;

/// Errors raised by search and detail collaborators.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The call did not finish within the per-call timeout
    #[error(
        "lookup for '{query}' timed out after {timeout_ms} ms\n  Suggestion: Raise per_call_timeout_ms or check the service status"
    )]
    Timeout {
        /// The query or id being looked up
        query: String,
        /// The timeout that fired
        timeout_ms: u64,
    },

    /// The request never produced a response
    #[error("request for '{query}' failed: {reason}\n  Suggestion: Check your network connection")]
    RequestFailed {
        /// The query or id being looked up
        query: String,
        /// Transport-level reason
        reason: String,
    },

    /// The service answered with a non-success status
    #[error("lookup for '{query}' returned HTTP {status}\n  Suggestion: {suggestion}")]
    HttpStatus {
        /// The query or id being looked up
        query: String,
        /// HTTP status code
        status: u16,
        /// How to fix the issue
        suggestion: String,
    },

    /// The response body did not have the expected shape
    #[error("unexpected response for '{query}': {reason}")]
    UnexpectedResponse {
        /// The query or id being looked up
        query: String,
        /// What was wrong with the body
        reason: String,
    },

    /// No API key was supplied to a collaborator that needs one
    #[error("no API key configured for {service}\n  Suggestion: Pass --api-key or set YT_API_KEY, or run with --offline")]
    MissingApiKey {
        /// The service requiring the key
        service: String,
    },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client for {service}: {reason}")]
    ClientBuild {
        /// The service the client was for
        service: String,
        /// Why construction failed
        reason: String,
    },
}

impl ResolveError {
    #[must_use]
    pub fn timeout(query: &str, timeout_ms: u64) -> Self {
        Self::Timeout {
            query: query.to_string(),
            timeout_ms,
        }
    }

    #[must_use]
    pub fn request_failed(query: &str, reason: impl std::fmt::Display) -> Self {
        Self::RequestFailed {
            query: query.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates an `HttpStatus` error with a status-specific suggestion.
    #[must_use]
    pub fn http_status(query: &str, status: u16) -> Self {
        let suggestion = match status {
            400 => "The request was rejected; check the query parameters",
            401 | 403 => "Check that the API key is valid and the quota is not exhausted",
            404 => "The requested resource does not exist",
            429 => "Rate limited; lower --concurrency or try again later",
            s if s >= 500 => "The service is unavailable; try again later",
            _ => "Try again later",
        };
        Self::HttpStatus {
            query: query.to_string(),
            status,
            suggestion: suggestion.to_string(),
        }
    }

    #[must_use]
    pub fn unexpected_response(query: &str, reason: impl std::fmt::Display) -> Self {
        Self::UnexpectedResponse {
            query: query.to_string(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn missing_api_key(service: &str) -> Self {
        Self::MissingApiKey {
            service: service.to_string(),
        }
    }

    #[must_use]
    pub fn client_build(service: &str, reason: impl std::fmt::Display) -> Self {
        Self::ClientBuild {
            service: service.to_string(),
            reason: reason.to_string(),
        }
    }
}
