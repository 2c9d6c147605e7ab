//! robots.txt policy evaluation with a per-host decision cache.
//!
//! [`PolicyChecker::evaluate`] answers "is this URL crawlable by this agent?".
//! The policy document is fetched once per origin and cached for the
//! checker's lifetime; absence of a reachable document defaults to allowed
//! (absence of a stated restriction permits crawling).

mod rules;

pub use rules::{RobotsDoc, RobotsRule, Verdict, best_match};

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqwest::header::USER_AGENT;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::fetch::HttpClient;

/// Outcome of a robots policy evaluation for one URL and agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Whether the path may be fetched.
    pub allowed: bool,
    /// Host-requested delay between fetches, if the policy declares one.
    pub crawl_delay: Option<Duration>,
}

impl PolicyDecision {
    /// The permissive default: allowed, no delay.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            allowed: true,
            crawl_delay: None,
        }
    }
}

/// robots.txt checker with a per-origin document cache.
///
/// The cache is process-scoped: one robots.txt fetch per origin per checker,
/// with concurrent first lookups collapsed onto a single fetch.
#[derive(Debug)]
pub struct PolicyChecker {
    client: HttpClient,
    cache: DashMap<String, Arc<OnceCell<RobotsDoc>>>,
}

impl PolicyChecker {
    /// Creates a checker that fetches robots.txt with the given client.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            cache: DashMap::new(),
        }
    }

    /// Evaluates whether `url` may be fetched by `agent`.
    ///
    /// Never fails: an unparseable URL, an unreachable host, or a missing
    /// robots.txt all yield the permissive default.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn evaluate(&self, url: &str, agent: &str) -> PolicyDecision {
        let Ok(parsed) = url::Url::parse(url) else {
            debug!("URL does not parse; policy defaults to allowed");
            return PolicyDecision::permissive();
        };
        let Some(origin) = origin_of(&parsed) else {
            debug!("URL has no host; policy defaults to allowed");
            return PolicyDecision::permissive();
        };

        let doc = self.doc_for_origin(&origin, agent).await;
        let path = if parsed.path().is_empty() {
            "/"
        } else {
            parsed.path()
        };
        let allowed = doc.is_allowed(path, agent);
        if !allowed {
            debug!(path = %path, origin = %origin, "robots.txt disallows path");
        }
        PolicyDecision {
            allowed,
            crawl_delay: doc.crawl_delay_for(agent),
        }
    }

    /// Returns the cached document for an origin, fetching it on first use.
    ///
    /// The per-origin `OnceCell` guarantees the robots.txt fetch happens at
    /// most once even when lookups race.
    async fn doc_for_origin(&self, origin: &str, agent: &str) -> RobotsDoc {
        let cell = self
            .cache
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_init(|| fetch_robots(&self.client, origin, agent))
            .await
            .clone()
    }
}

/// Fetches and parses `<origin>/robots.txt`, identifying as the agent the
/// policy is being evaluated for.
///
/// Any failure mode (network error, non-2xx status) degrades to the empty
/// document, which allows everything.
async fn fetch_robots(client: &HttpClient, origin: &str, agent: &str) -> RobotsDoc {
    let robots_url = format!("{origin}/robots.txt");
    let response = match client
        .inner()
        .get(&robots_url)
        .header(USER_AGENT, agent)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(url = %robots_url, error = %e, "robots.txt unreachable; defaulting to allowed");
            return RobotsDoc::empty();
        }
    };
    if !response.status().is_success() {
        debug!(url = %robots_url, status = response.status().as_u16(), "no robots.txt; defaulting to allowed");
        return RobotsDoc::empty();
    }
    match response.text().await {
        Ok(body) => RobotsDoc::parse(&body),
        Err(e) => {
            warn!(url = %robots_url, error = %e, "robots.txt body unreadable; defaulting to allowed");
            RobotsDoc::empty()
        }
    }
}

/// Builds the origin string (scheme + host + optional port) for a URL.
fn origin_of(url: &url::Url) -> Option<String> {
    let host = url.host_str()?;
    let scheme = url.scheme();
    Some(match url.port() {
        Some(p) => format!("{scheme}://{host}:{p}"),
        None => format!("{scheme}://{host}"),
    })
}
