//! Integration tests for robots policy evaluation against a mock host.

use std::time::Duration;

use harvester_core::fetch::HttpClient;
use harvester_core::policy::PolicyChecker;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT: &str = "harvester-test/0.1";

fn checker() -> PolicyChecker {
    PolicyChecker::new(HttpClient::with_timeout(Duration::from_secs(2)))
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_no_robots_document_defaults_to_allowed() {
    let server = MockServer::start().await;
    // No robots.txt mock mounted: the fetch gets a 404
    let checker = checker();
    let d = checker
        .evaluate(&format!("{}/anything", server.uri()), AGENT)
        .await;
    assert!(d.allowed, "absent robots.txt must permit crawling");
    assert_eq!(d.crawl_delay, None);
}

#[tokio::test]
async fn test_wildcard_disallow_blocks_any_agent() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /private/\n").await;

    let checker = checker();
    let blocked = checker
        .evaluate(&format!("{}/private/paper", server.uri()), "any-bot/1.0")
        .await;
    assert!(!blocked.allowed);
    let open = checker
        .evaluate(&format!("{}/public/paper", server.uri()), "any-bot/1.0")
        .await;
    assert!(open.allowed);
}

#[tokio::test]
async fn test_agent_specific_allow_overrides_wildcard_disallow() {
    let server = MockServer::start().await;
    mount_robots(
        &server,
        "User-agent: *\nDisallow: /papers/\n\nUser-agent: harvester-test\nAllow: /papers/\n",
    )
    .await;

    let checker = checker();
    let d = checker
        .evaluate(&format!("{}/papers/1", server.uri()), AGENT)
        .await;
    assert!(d.allowed, "agent-specific allow must win the tie");
    let other = checker
        .evaluate(&format!("{}/papers/1", server.uri()), "other-bot")
        .await;
    assert!(!other.allowed);
}

#[tokio::test]
async fn test_robots_fetched_once_per_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /x/\n"),
        )
        .expect(1) // cache must collapse repeated evaluations
        .mount(&server)
        .await;

    let checker = checker();
    for i in 0..5 {
        let d = checker
            .evaluate(&format!("{}/x/{i}", server.uri()), AGENT)
            .await;
        assert!(!d.allowed);
    }
}

#[tokio::test]
async fn test_crawl_delay_reported_in_decision() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nCrawl-delay: 1.5\nDisallow: /y/\n").await;

    let checker = checker();
    let d = checker
        .evaluate(&format!("{}/ok", server.uri()), AGENT)
        .await;
    assert!(d.allowed);
    assert_eq!(d.crawl_delay, Some(Duration::from_millis(1500)));
}

#[tokio::test]
async fn test_robots_fetch_identifies_as_evaluated_agent() {
    let server = MockServer::start().await;
    // Only a request carrying the evaluated agent's UA sees the disallow
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .and(wiremock::matchers::header("user-agent", AGENT))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /z/\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let checker = checker();
    let d = checker
        .evaluate(&format!("{}/z/paper", server.uri()), AGENT)
        .await;
    assert!(
        !d.allowed,
        "robots fetch must send the evaluated agent as User-Agent"
    );
}

#[tokio::test]
async fn test_robots_server_error_defaults_to_allowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let checker = checker();
    let d = checker
        .evaluate(&format!("{}/anything", server.uri()), AGENT)
        .await;
    assert!(d.allowed, "robots fetch failure must not block crawling");
}
