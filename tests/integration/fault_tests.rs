//! Runs that end in a stage failure

use crate::{create_test_config, detail_page, html, listing_page, mount_page, RUN_LIMIT};
use pagewalk::crawler::Coordinator;
use pagewalk::{CrawlError, Detail, FetchError, Stage};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_detail_timeout_fails_detail_stage() {
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&["/post1", "/post2", "/post3"])).await;
    mount_page(&server, "/page2", listing_page(&["/post4"])).await;
    mount_page(&server, "/post1", detail_page("T1")).await;
    mount_page(&server, "/post3", detail_page("T3")).await;
    mount_page(&server, "/post4", detail_page("T4")).await;

    // Detail fetches are not retried: exactly one request reaches item 2
    Mock::given(method("GET"))
        .and(path("/post2"))
        .respond_with(html(detail_page("T2")).set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(create_test_config(&server.uri())).unwrap();
    let mut details: Vec<Detail> = Vec::new();

    let started = Instant::now();
    let result = tokio::time::timeout(RUN_LIMIT, coordinator.run(&mut details))
        .await
        .expect("Crawl did not finish");

    // Both stages were joined before run returned, well before the stalled
    // response would have completed
    assert!(started.elapsed() < Duration::from_secs(3));

    let titles: Vec<&str> = details.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["T1"]);

    let error = result.unwrap_err();
    assert_eq!(error.stage(), Some(Stage::Detail));
    match error {
        CrawlError::StageFailed { source, .. } => {
            assert!(matches!(*source, CrawlError::Fetch(FetchError::Timeout { .. })));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_detail_retry_recovers_when_enabled() {
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&["/post1"])).await;
    mount_page(&server, "/page2", listing_page(&[])).await;

    Mock::given(method("GET"))
        .and(path("/post1"))
        .respond_with(html(detail_page("T1")).set_delay(Duration::from_secs(2)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/post1", detail_page("T1")).await;

    let mut config = create_test_config(&server.uri());
    config.retry.retry_detail = true;

    let mut details: Vec<Detail> = Vec::new();
    tokio::time::timeout(RUN_LIMIT, pagewalk::crawl(config, &mut details))
        .await
        .expect("Crawl did not finish")
        .expect("Crawl failed");

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].title, "T1");
}

#[tokio::test]
async fn test_listing_retries_exhausted_fails_discovery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/post1"])).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&server)
        .await;

    let mut details: Vec<Detail> = Vec::new();
    let result = tokio::time::timeout(
        RUN_LIMIT,
        pagewalk::crawl(create_test_config(&server.uri()), &mut details),
    )
    .await
    .expect("Crawl did not finish");

    assert!(details.is_empty());
    let error = result.unwrap_err();
    assert_eq!(error.stage(), Some(Stage::Discovery));
    assert!(error.to_string().starts_with("discovery stage failed"));
}

#[tokio::test]
async fn test_discovery_failure_on_later_page_keeps_earlier_details() {
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&["/post1"])).await;
    mount_page(&server, "/post1", detail_page("T1")).await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(listing_page(&[])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let mut details: Vec<Detail> = Vec::new();
    let result = tokio::time::timeout(
        RUN_LIMIT,
        pagewalk::crawl(create_test_config(&server.uri()), &mut details),
    )
    .await
    .expect("Crawl did not finish");

    assert_eq!(result.unwrap_err().stage(), Some(Stage::Discovery));
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].title, "T1");
}

#[tokio::test]
async fn test_unreachable_site_fails_discovery() {
    // Port 9 (discard) is closed on test hosts
    let mut config = create_test_config("http://127.0.0.1:9");
    config.retry.delay_ms = 1;

    let mut details: Vec<Detail> = Vec::new();
    let result = pagewalk::crawl(config, &mut details).await;

    assert!(details.is_empty());
    assert_eq!(result.unwrap_err().stage(), Some(Stage::Discovery));
}

/// Serves every request with a body cut short of its declared length and
/// counts the requests it answered
async fn spawn_truncating_server() -> (String, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicU32::new(0));

    let counter = requests.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 1000\r\n\r\n<html>short",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), requests)
}

#[tokio::test]
async fn test_truncated_listing_body_fails_without_retry() {
    let (root, requests) = spawn_truncating_server().await;
    let mut details: Vec<Detail> = Vec::new();

    let result = tokio::time::timeout(
        RUN_LIMIT,
        pagewalk::crawl(create_test_config(&root), &mut details),
    )
    .await
    .expect("Crawl did not finish");

    assert!(details.is_empty());
    assert_eq!(requests.load(Ordering::SeqCst), 1);

    let error = result.unwrap_err();
    assert_eq!(error.stage(), Some(Stage::Discovery));
    match error {
        CrawlError::StageFailed { source, .. } => {
            assert!(matches!(*source, CrawlError::Fetch(FetchError::Body { .. })));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_shutdown_aborts_in_flight_listing_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&["/post1"])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.fetch.timeout_ms = 10_000;
    let coordinator = Coordinator::new(config).unwrap();

    let shutdown = coordinator.shutdown_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
    });

    let mut details: Vec<Detail> = Vec::new();
    let started = Instant::now();
    let result = tokio::time::timeout(RUN_LIMIT, coordinator.run(&mut details))
        .await
        .expect("Crawl did not finish");

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(matches!(result, Err(CrawlError::Interrupted)));
    assert!(details.is_empty());
}

#[tokio::test]
async fn test_detail_failure_aborts_sibling_listing_fetch() {
    let server = MockServer::start().await;
    // Port 9 (discard) is closed on test hosts, so the detail fetch is refused
    mount_page(&server, "/", listing_page(&["http://127.0.0.1:9/post1"])).await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(listing_page(&[])).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.fetch.timeout_ms = 10_000;

    let mut details: Vec<Detail> = Vec::new();
    let started = Instant::now();
    let result = tokio::time::timeout(RUN_LIMIT, pagewalk::crawl(config, &mut details))
        .await
        .expect("Crawl did not finish");

    // The discovery stage was still waiting on page 2 when detail failed
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(details.is_empty());
    assert_eq!(result.unwrap_err().stage(), Some(Stage::Detail));
}
