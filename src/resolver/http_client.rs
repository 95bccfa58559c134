//! Shared HTTP client construction for network-backed collaborators.
//!
//! Every client gets the same connect/read timeouts, the crate user-agent
//! and gzip, so lookups behave the same regardless of which service they hit.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::ResolveError;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default whole-request timeout. The resolver pool applies its own per-call
/// timeout on top of this.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeouts applied to a collaborator HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            read: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Builds a client for `service` with the shared policy.
///
/// `service` only appears in logs and errors, never in the User-Agent.
///
/// # Errors
///
/// Returns [`ResolveError::ClientBuild`] when reqwest cannot build the client.
pub fn build_http_client(service: &str, timeouts: HttpTimeouts) -> Result<Client, ResolveError> {
    match try_build(timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildFailure::Panic) => {
            // System proxy lookup panics in some sandboxes; retry reading
            // proxies from the environment only.
            warn!(service, "system proxy lookup panicked; retrying with env proxies only");
            match try_build(timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildFailure::Panic) => Err(ResolveError::client_build(
                    service,
                    "client construction panicked",
                )),
                Err(BuildFailure::Build(error)) => Err(ResolveError::client_build(service, error)),
            }
        }
        Err(BuildFailure::Build(error)) => Err(ResolveError::client_build(service, error)),
    }
}

enum BuildFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build(timeouts: HttpTimeouts, env_proxies_only: bool) -> Result<Client, BuildFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .user_agent(user_agent::default_user_agent())
            .gzip(true);
        if env_proxies_only {
            builder = with_env_proxies(builder.no_proxy());
        }
        builder.build().map_err(BuildFailure::Build)
    }))
    .map_err(|_| BuildFailure::Panic)?
}

fn with_env_proxies(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = first_env(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(proxy) = Proxy::https(&proxy)
    {
        builder = builder.proxy(proxy);
    }
    if let Some(proxy) = first_env(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(proxy) = Proxy::http(&proxy)
    {
        builder = builder.proxy(proxy);
    }
    builder
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_http_timeouts_default() {
        let timeouts = HttpTimeouts::default();
        assert_eq!(timeouts.connect, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(timeouts.read, DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn test_build_http_client_succeeds() {
        assert!(build_http_client("youtube", HttpTimeouts::default()).is_ok());
    }
}
