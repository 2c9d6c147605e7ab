//! Crawl orchestration: policy check, fetch, extract, assemble, log.
//!
//! Targets are processed sequentially to respect per-host crawl courtesy:
//! no host is fetched concurrently with itself, every policy decision for a
//! host happens before any fetch to that host, and the host's crawl-delay is
//! honored between consecutive fetches. A single target's failure never
//! aborts the run; each target's disposition lands in the outcome log.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::extract;
use crate::fetch::{FetchError, HttpClient, PageFetcher, RetryPolicy};
use crate::policy::PolicyChecker;
use crate::record::{self, PaperRecord, RunContext};

/// One URL to crawl plus the agent string it identifies as.
///
/// Immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The page URL.
    pub url: String,
    /// User-Agent used for the robots check and the fetch.
    pub agent: String,
}

impl CrawlTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(url: impl Into<String>, agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: agent.into(),
        }
    }
}

/// How the pipeline disposed of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched, extracted, and assembled into a record.
    Crawled,
    /// robots.txt disallowed the target; no fetch was attempted.
    PolicySkipped,
    /// The fetch failed after retries or was rejected.
    FetchFailed,
    /// Extraction produced no usable identity, or the link was already
    /// assembled this run.
    AssemblySkipped,
}

/// Outcome log entry: target URL and its disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    /// The target URL.
    pub url: String,
    /// What happened to it.
    pub outcome: Outcome,
}

/// Result of a full pipeline run.
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Successfully assembled records, deduplicated by link, in target
    /// order.
    pub records: Vec<PaperRecord>,
    /// One entry per processed target, parallel to the input order.
    pub outcomes: Vec<TargetOutcome>,
}

impl CrawlReport {
    /// Number of targets with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == outcome)
            .count()
    }
}

/// Pipeline construction knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Total timeout for a single page retrieval.
    pub timeout: Duration,
    /// Retry policy for transient fetch failures.
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::fetch::DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Orchestrates PolicyChecker, PageFetcher, FieldExtractor and
/// RecordAssembler over a target list.
#[derive(Debug)]
pub struct CrawlPipeline {
    policy: PolicyChecker,
    fetcher: PageFetcher,
    stop: Arc<AtomicBool>,
}

impl Default for CrawlPipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl CrawlPipeline {
    /// Creates a pipeline; the policy checker and fetcher share one HTTP
    /// client.
    #[must_use]
    pub fn new(config: &PipelineConfig) -> Self {
        let client = HttpClient::with_timeout(config.timeout);
        Self {
            policy: PolicyChecker::new(client.clone()),
            fetcher: PageFetcher::new(client, config.retry),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting a stop. The flag is checked between targets;
    /// an in-flight fetch completes or times out naturally.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Crawls the targets in order and returns records plus the outcome log.
    ///
    /// Per-target failures are downgraded to outcomes; a full run never
    /// fails. Dedup state is scoped to this call.
    #[instrument(skip(self, targets), fields(targets = targets.len()))]
    pub async fn run(&self, targets: &[CrawlTarget]) -> CrawlReport {
        let mut ctx = RunContext::new();
        let mut report = CrawlReport::default();
        // Earliest next-fetch instant per host, from robots crawl-delay.
        let mut next_fetch: HashMap<String, Instant> = HashMap::new();

        for target in targets {
            if self.stop.load(Ordering::SeqCst) {
                info!(
                    remaining = targets.len() - report.outcomes.len(),
                    "stop requested; ending run between targets"
                );
                break;
            }
            let outcome = self
                .process(target, &mut ctx, &mut next_fetch, &mut report.records)
                .await;
            report.outcomes.push(TargetOutcome {
                url: target.url.clone(),
                outcome,
            });
        }

        info!(
            crawled = report.count(Outcome::Crawled),
            policy_skipped = report.count(Outcome::PolicySkipped),
            fetch_failed = report.count(Outcome::FetchFailed),
            assembly_skipped = report.count(Outcome::AssemblySkipped),
            records = report.records.len(),
            "run complete"
        );
        report
    }

    /// Runs one target through policy, fetch, extract, assemble.
    async fn process(
        &self,
        target: &CrawlTarget,
        ctx: &mut RunContext,
        next_fetch: &mut HashMap<String, Instant>,
        records: &mut Vec<PaperRecord>,
    ) -> Outcome {
        // Policy decision always happens before the fetch for this host.
        let decision = self.policy.evaluate(&target.url, &target.agent).await;
        if !decision.allowed {
            info!(url = %target.url, "policy disallows target; skipping without fetch");
            return Outcome::PolicySkipped;
        }

        let host = host_of(&target.url);
        if let Some(host) = &host {
            if let Some(at) = next_fetch.get(host) {
                let now = Instant::now();
                if *at > now {
                    debug!(host = %host, wait_ms = (*at - now).as_millis() as u64, "honoring crawl-delay");
                    tokio::time::sleep_until(*at).await;
                }
            }
        }

        let fetched = self.fetcher.fetch(&target.url, &target.agent).await;
        // The delay is owed for the attempt itself, so it is recorded even
        // when the fetch failed.
        if let (Some(host), Some(delay)) = (host, decision.crawl_delay) {
            next_fetch.insert(host, Instant::now() + delay);
        }
        let page = match fetched {
            Ok(page) => page,
            Err(e @ FetchError::Rejected { .. }) => {
                warn!(url = %target.url, error = %e, "target rejected");
                return Outcome::FetchFailed;
            }
            Err(e @ FetchError::Unreachable { .. }) => {
                warn!(url = %target.url, error = %e, "target unreachable");
                return Outcome::FetchFailed;
            }
        };

        let fields = extract::extract(&page);
        match record::assemble(fields, &page.url, ctx) {
            Ok(Some(record)) => {
                debug!(link = %record.link, "record assembled");
                records.push(record);
                Outcome::Crawled
            }
            Ok(None) => {
                debug!(url = %target.url, "duplicate record; skipping");
                Outcome::AssemblySkipped
            }
            Err(e) => {
                warn!(url = %target.url, error = %e, "assembly skipped");
                Outcome::AssemblySkipped
            }
        }
    }
}

/// Host key for crawl-delay pacing.
fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(ToString::to_string)
}
