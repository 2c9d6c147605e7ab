//! Shared User-Agent string for crawl and robots.txt HTTP traffic.
//!
//! Single source for project URL and UA format so page and policy fetches
//! stay consistent and easy to update (good citizenship; RFC 9308).

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/harvester";

/// Default User-Agent for crawl requests (identifies the tool).
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("harvester/{version} (academic-metadata-crawler; +{PROJECT_UA_URL})")
}
