//! User-Agent string shared by every outbound HTTP client.

const PROJECT_UA_URL: &str = "https://github.com/tracklist-rs/tracklist";

/// `tracklist/<version> (+<project url>)`
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("tracklist/{version} (+{PROJECT_UA_URL})")
}
