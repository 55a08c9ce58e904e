//! End-to-end runs that finish successfully

use crate::{create_test_config, detail_page, html, listing_page, mount_page, RUN_LIMIT};
use pagewalk::crawler::Coordinator;
use pagewalk::output::JsonLinesSink;
use pagewalk::Detail;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Two listing pages (3 items, then 1 item) followed by an empty third page
async fn two_page_site() -> MockServer {
    let server = MockServer::start().await;

    mount_page(&server, "/", listing_page(&["/post1", "/post2", "/post3"])).await;
    mount_page(&server, "/page2", listing_page(&["/post4"])).await;
    mount_page(&server, "/page3", listing_page(&[])).await;
    for n in 1..=4 {
        mount_page(&server, &format!("/post{}", n), detail_page(&format!("T{}", n))).await;
    }

    // The walk must stop at the first empty page
    Mock::given(method("GET"))
        .and(path("/page4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    server
}

fn expected(base: &str, page: u32, n: u32) -> Detail {
    Detail {
        url: format!("{}/post{}", base, n),
        page,
        title: format!("T{}", n),
    }
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let server = two_page_site().await;
    let base = server.uri();

    let coordinator = Coordinator::new(create_test_config(&base)).expect("Failed to create coordinator");
    let mut details: Vec<Detail> = Vec::new();

    let stats = tokio::time::timeout(RUN_LIMIT, coordinator.run(&mut details))
        .await
        .expect("Crawl did not finish")
        .expect("Crawl failed");

    assert_eq!(
        details,
        vec![
            expected(&base, 1, 1),
            expected(&base, 1, 2),
            expected(&base, 1, 3),
            expected(&base, 2, 4),
        ]
    );
    assert_eq!(stats.details, 4);
    assert_eq!(stats.last_page, 2);
}

#[tokio::test]
async fn test_full_crawl_with_wider_channels_keeps_order() {
    let server = two_page_site().await;
    let base = server.uri();

    let mut config = create_test_config(&base);
    config.pipeline.channel_capacity = 8;

    let mut details: Vec<Detail> = Vec::new();
    pagewalk::crawl(config, &mut details)
        .await
        .expect("Crawl failed");

    let titles: Vec<&str> = details.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["T1", "T2", "T3", "T4"]);
}

#[tokio::test]
async fn test_empty_first_page_yields_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&[])).await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut details: Vec<Detail> = Vec::new();
    let stats = pagewalk::crawl(create_test_config(&server.uri()), &mut details)
        .await
        .expect("Crawl failed");

    assert!(details.is_empty());
    assert_eq!(stats.details, 0);
}

#[tokio::test]
async fn test_missing_listing_page_ends_walk() {
    // Unmatched routes answer 404 with an empty body: no items, end of listing
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&["/post1"])).await;
    mount_page(&server, "/post1", detail_page("T1")).await;

    let mut details: Vec<Detail> = Vec::new();
    pagewalk::crawl(create_test_config(&server.uri()), &mut details)
        .await
        .expect("Crawl failed");

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].title, "T1");
}

#[tokio::test]
async fn test_listing_retry_then_success() {
    let server = MockServer::start().await;

    // First two attempts at page 1 time out
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html(listing_page(&["/post1"])).set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", listing_page(&["/post1"])).await;
    mount_page(&server, "/page2", listing_page(&[])).await;
    mount_page(&server, "/post1", detail_page("T1")).await;

    let mut details: Vec<Detail> = Vec::new();
    tokio::time::timeout(
        RUN_LIMIT,
        pagewalk::crawl(create_test_config(&server.uri()), &mut details),
    )
    .await
    .expect("Crawl did not finish")
    .expect("Crawl failed");

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].page, 1);
}

#[tokio::test]
async fn test_max_pages_bounds_walk() {
    let server = MockServer::start().await;
    mount_page(&server, "/", listing_page(&["/post1", "/post2"])).await;
    mount_page(&server, "/post1", detail_page("T1")).await;
    mount_page(&server, "/post2", detail_page("T2")).await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(listing_page(&["/post3"])))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri());
    config.pipeline.max_pages = 1;

    let mut details: Vec<Detail> = Vec::new();
    pagewalk::crawl(config, &mut details)
        .await
        .expect("Crawl failed");

    let titles: Vec<&str> = details.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["T1", "T2"]);
}

#[tokio::test]
async fn test_json_lines_output() {
    let server = two_page_site().await;

    let mut sink = JsonLinesSink::new(Vec::new());
    pagewalk::crawl(create_test_config(&server.uri()), &mut sink)
        .await
        .expect("Crawl failed");

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["title"], "T1");
    assert_eq!(lines[3]["page"], 2);
}

#[tokio::test]
async fn test_custom_selectors_and_prefix() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<ul><li class="entry"><a class="go" href="/x">x</a></li></ul>"#.to_string(),
    )
    .await;
    mount_page(&server, "/p2", "<ul></ul>".to_string()).await;
    mount_page(&server, "/x", "<h2>Custom</h2>".to_string()).await;

    let mut config = create_test_config(&server.uri());
    config.site.page_prefix = "p".to_string();
    config.selectors.item = "li.entry".to_string();
    config.selectors.item_link = "a.go".to_string();
    config.selectors.title = "h2".to_string();

    let mut details: Vec<Detail> = Vec::new();
    pagewalk::crawl(config, &mut details)
        .await
        .expect("Crawl failed");

    assert_eq!(details.len(), 1);
    assert_eq!(details[0].title, "Custom");
    assert_eq!(details[0].url, format!("{}/x", server.uri()));
}
