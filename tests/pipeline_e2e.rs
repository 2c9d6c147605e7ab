//! End-to-end pipeline scenarios: policy skips, fetch failures, extraction
//! defaults, and link deduplication over a mock host.

use std::time::Duration;

use harvester_core::fetch::RetryPolicy;
use harvester_core::pipeline::{CrawlPipeline, CrawlTarget, Outcome, PipelineConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT: &str = "harvester-test/0.1";

fn quick_pipeline() -> CrawlPipeline {
    CrawlPipeline::new(&PipelineConfig {
        timeout: Duration::from_secs(2),
        retry: RetryPolicy::new(1, Duration::from_millis(10)),
    })
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn abstract_page(title: &str, authors: &str, subjects: &str, canonical: &str) -> String {
    format!(
        r#"<html><head><link rel="canonical" href="{canonical}"/></head><body>
        <h1 class="title">Title: {title}</h1>
        <div class="authors">{authors}</div>
        <div class="list-subjects">Subjects: {subjects}</div>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_allowed_and_disallowed_targets_end_to_end() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private/\n").await;

    let url_a = format!("{}/abs/a", server.uri());
    let url_b = format!("{}/private/b", server.uri());
    mount_page(
        &server,
        "/abs/a",
        abstract_page("Graph Theory", "A. Smith; B. Lee", "math.CO", &url_a),
    )
    .await;

    let pipeline = quick_pipeline();
    let targets = vec![
        CrawlTarget::new(&url_a, AGENT),
        CrawlTarget::new(&url_b, AGENT),
    ];
    let report = pipeline.run(&targets).await;

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.title, "Graph Theory");
    assert_eq!(record.authors, vec!["A. Smith", "B. Lee"]);
    assert_eq!(record.link, url_a);
    assert!(record.subjects.contains("math.CO"));

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].url, url_a);
    assert_eq!(report.outcomes[0].outcome, Outcome::Crawled);
    assert_eq!(report.outcomes[1].url, url_b);
    assert_eq!(report.outcomes[1].outcome, Outcome::PolicySkipped);
}

#[tokio::test]
async fn test_fetch_failure_does_not_abort_the_run() {
    let server = MockServer::start().await;
    let url_bad = format!("{}/abs/broken", server.uri());
    let url_good = format!("{}/abs/good", server.uri());
    Mock::given(method("GET"))
        .and(path("/abs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/abs/good",
        abstract_page("Survives", "C. Wu", "cs.DM", &url_good),
    )
    .await;

    let report = quick_pipeline()
        .run(&[
            CrawlTarget::new(&url_bad, AGENT),
            CrawlTarget::new(&url_good, AGENT),
        ])
        .await;

    assert_eq!(report.outcomes[0].outcome, Outcome::FetchFailed);
    assert_eq!(report.outcomes[1].outcome, Outcome::Crawled);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Survives");
}

#[tokio::test]
async fn test_duplicate_canonical_link_yields_one_record() {
    let server = MockServer::start().await;
    let canonical = format!("{}/abs/same", server.uri());
    mount_page(
        &server,
        "/abs/mirror1",
        abstract_page("First Occurrence", "A. Smith", "math.CO", &canonical),
    )
    .await;
    mount_page(
        &server,
        "/abs/mirror2",
        abstract_page("Second Occurrence", "A. Smith", "math.CO", &canonical),
    )
    .await;

    let report = quick_pipeline()
        .run(&[
            CrawlTarget::new(format!("{}/abs/mirror1", server.uri()), AGENT),
            CrawlTarget::new(format!("{}/abs/mirror2", server.uri()), AGENT),
        ])
        .await;

    assert_eq!(report.records.len(), 1, "dedup must keep a single record");
    assert_eq!(
        report.records[0].title, "First Occurrence",
        "first occurrence wins"
    );
    assert_eq!(report.outcomes[0].outcome, Outcome::Crawled);
    assert_eq!(report.outcomes[1].outcome, Outcome::AssemblySkipped);
}

#[tokio::test]
async fn test_page_without_link_is_assembly_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/abs/nolink",
        "<html><body><h1 class=\"title\">Title: Orphan</h1></body></html>".to_string(),
    )
    .await;

    let report = quick_pipeline()
        .run(&[CrawlTarget::new(
            format!("{}/abs/nolink", server.uri()),
            AGENT,
        )])
        .await;

    assert!(report.records.is_empty());
    assert_eq!(report.outcomes[0].outcome, Outcome::AssemblySkipped);
}

#[tokio::test]
async fn test_missing_authors_landmark_yields_empty_author_list() {
    let server = MockServer::start().await;
    let url = format!("{}/abs/solo", server.uri());
    mount_page(
        &server,
        "/abs/solo",
        format!(
            r#"<html><head><link rel="canonical" href="{url}"/></head>
            <body><h1 class="title">Title: No Authors Here</h1></body></html>"#
        ),
    )
    .await;

    let report = quick_pipeline()
        .run(&[CrawlTarget::new(&url, AGENT)])
        .await;

    assert_eq!(report.outcomes[0].outcome, Outcome::Crawled);
    assert_eq!(report.records.len(), 1, "missing authors is not a rejection");
    assert!(report.records[0].authors.is_empty());
}

#[tokio::test]
async fn test_untitled_default_applied() {
    let server = MockServer::start().await;
    let url = format!("{}/abs/bare", server.uri());
    mount_page(
        &server,
        "/abs/bare",
        format!(r#"<link rel="canonical" href="{url}"/>"#),
    )
    .await;

    let report = quick_pipeline()
        .run(&[CrawlTarget::new(&url, AGENT)])
        .await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Untitled");
}

#[tokio::test]
async fn test_repeated_runs_produce_same_record_set() {
    let server = MockServer::start().await;
    let url_1 = format!("{}/abs/p1", server.uri());
    let url_2 = format!("{}/abs/p2", server.uri());
    mount_page(
        &server,
        "/abs/p1",
        abstract_page("P One", "A. Smith", "math.CO", &url_1),
    )
    .await;
    mount_page(
        &server,
        "/abs/p2",
        abstract_page("P Two", "B. Lee", "cs.DM", &url_2),
    )
    .await;
    let targets = vec![
        CrawlTarget::new(&url_1, AGENT),
        CrawlTarget::new(&url_2, AGENT),
    ];

    let first = quick_pipeline().run(&targets).await;
    let second = quick_pipeline().run(&targets).await;

    assert_eq!(first.records.len(), 2);
    assert_eq!(
        first.records, second.records,
        "stable remote must give identical record sets; dedup state is per run"
    );
}

#[tokio::test]
async fn test_crawl_delay_honored_after_failed_fetch() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 0.2\n").await;
    let url_ok = format!("{}/abs/after", server.uri());
    Mock::given(method("GET"))
        .and(path("/abs/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/abs/after",
        abstract_page("After Failure", "A. Smith", "math.CO", &url_ok),
    )
    .await;

    let started = std::time::Instant::now();
    let report = quick_pipeline()
        .run(&[
            CrawlTarget::new(format!("{}/abs/gone", server.uri()), AGENT),
            CrawlTarget::new(&url_ok, AGENT),
        ])
        .await;

    assert_eq!(report.outcomes[0].outcome, Outcome::FetchFailed);
    assert_eq!(report.outcomes[1].outcome, Outcome::Crawled);
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "the delay is owed for the failed attempt too"
    );
}

#[tokio::test]
async fn test_crawl_delay_spaces_same_host_fetches() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 0.2\n").await;
    let url_1 = format!("{}/abs/d1", server.uri());
    let url_2 = format!("{}/abs/d2", server.uri());
    mount_page(
        &server,
        "/abs/d1",
        abstract_page("D One", "A", "x", &url_1),
    )
    .await;
    mount_page(
        &server,
        "/abs/d2",
        abstract_page("D Two", "B", "y", &url_2),
    )
    .await;

    let started = std::time::Instant::now();
    let report = quick_pipeline()
        .run(&[
            CrawlTarget::new(&url_1, AGENT),
            CrawlTarget::new(&url_2, AGENT),
        ])
        .await;

    assert_eq!(report.records.len(), 2);
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "second same-host fetch must wait out the crawl delay"
    );
}
