//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock search endpoints and article
//! pages and run the full crawl cycle end-to-end, from configuration to the
//! CSV file on disk.

use press_trawl::config::{parse_config, Config};
use press_trawl::crawler::Coordinator;
use press_trawl::storage::{CsvSink, RecordSink};
use press_trawl::PaginationPhase;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a configuration with one extra site pointed at the mock server
fn create_test_config(output_root: &str, site_table: &str) -> Config {
    let toml = format!(
        r#"
[crawler]
start-page = 1
end-page = 1
sleep-on-fetch-error-ms = 0
sleep-on-empty-page-ms = 0
sleep-on-parse-error-ms = 0
max-fetch-retries = 2
max-empty-page-retries = 2

[http]
timeout-secs = 5

[output]
root = "{}"

{}
"#,
        output_root, site_table
    );
    parse_config(&toml).expect("test config should be valid")
}

fn article_html(title: &str, date: &str) -> String {
    format!(
        r#"<html><head>
            <title>{title}</title>
            <meta property="article:published_time" content="{date}T08:00:00Z">
        </head><body><article><p>{title} body text.</p></article></body></html>"#
    )
}

async fn mount_article(server: &MockServer, article_path: &str, title: &str, date: &str) {
    Mock::given(method("GET"))
        .and(path(article_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_html(title, date))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("output file should exist");
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn test_direct_site_dedups_anchors_and_writes_csv() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><body>
                    <a class="result-link" href="{base}/news/a">A</a>
                    <a class="result-link" href="{base}/news/b">B</a>
                    <a class="result-link" href="{base}/news/a">A again</a>
                    <a class="nav" href="{base}/about">About</a>
                    </body></html>"#
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_article(&server, "/news/a", "Story A", "2021-02-03").await;
    mount_article(&server, "/news/b", "Story B", "2021-02-04").await;

    let config = create_test_config(
        &out.path().display().to_string(),
        &format!(
            r#"
[[site]]
id = "mockpaper"
strategy = "direct"
joiner = "+"
template = "{base}/search?q={{keyword}}&page={{page}}"
anchor-class = "result-link"
"#
        ),
    );

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.crawl("mockpaper", "gun policy").await.unwrap();

    assert_eq!(report.discovery_phase, PaginationPhase::Done);
    assert_eq!(report.urls_found, 2);
    assert_eq!(report.saved, 2);

    let output = out.path().join("mockpaper/mockpaper_gun+policy.csv");
    assert_eq!(report.output_path, output);
    let rows = read_rows(&output);
    assert_eq!(
        rows,
        vec![
            vec![
                "Story A".to_string(),
                "Story A body text.".to_string(),
                format!("{base}/news/a"),
                "2021-02-03".to_string(),
            ],
            vec![
                "Story B".to_string(),
                "Story B body text.".to_string(),
                format!("{base}/news/b"),
                "2021-02-04".to_string(),
            ],
        ]
    );
}

#[tokio::test]
async fn test_jsonp_api_site_skips_items_without_url() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"__cb({{"result":[{{"url":"{base}/x/1"}},{{"url":"{base}/x/2"}},{{"bad":"item"}}]}})"#
        )))
        .mount(&server)
        .await;
    mount_article(&server, "/x/1", "One", "2020-01-01").await;
    mount_article(&server, "/x/2", "Two", "2020-01-02").await;

    let config = create_test_config(
        &out.path().display().to_string(),
        &format!(
            r#"
[[site]]
id = "mockapi"
strategy = "api"
joiner = "+"
template = "{base}/content?q={{keyword}}&from={{offset}}"
json-path = ["result"]
json-field = "url"
"#
        ),
    );

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.crawl("mockapi", "tariffs").await.unwrap();

    assert_eq!(report.urls_found, 2);
    assert_eq!(report.saved, 2);
    let urls: Vec<String> = read_rows(&report.output_path)
        .into_iter()
        .map(|row| row[2].clone())
        .collect();
    assert_eq!(urls, vec![format!("{base}/x/1"), format!("{base}/x/2")]);
}

#[tokio::test]
async fn test_relative_links_resolved_against_search_origin() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="results"><a class="hit" href="/2022/06/01/story">s</a></div>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2022/06/01/story"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(
                "<html><head><title>Undated</title></head><body><article><p>Text</p></article></body></html>",
            ),
        )
        .mount(&server)
        .await;

    let config = create_test_config(
        &out.path().display().to_string(),
        &format!(
            r#"
[[site]]
id = "relpaper"
strategy = "direct"
joiner = "%20"
template = "{base}/search?q={{keyword}}&page={{page}}"
anchor-class = "hit"
pre-container = "results"
has-domain-prefix = false
"#
        ),
    );

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.crawl("relpaper", "gun policy").await.unwrap();

    assert_eq!(report.saved, 1);
    let rows = read_rows(&out.path().join("relpaper/relpaper_gun%20policy.csv"));
    assert_eq!(rows[0][2], format!("{base}/2022/06/01/story"));
    // Date comes from the URL path when the page carries none
    assert_eq!(rows[0][3], "2022-06-01");
}

#[tokio::test]
async fn test_failing_search_page_retried_then_aborted() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(
        &out.path().display().to_string(),
        &format!(
            r#"
[[site]]
id = "downpaper"
strategy = "direct"
joiner = "+"
template = "{base}/search?q={{keyword}}&page={{page}}"
anchor-class = "hit"
"#
        ),
    );

    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.crawl("downpaper", "x").await.unwrap();

    assert_eq!(report.discovery_phase, PaginationPhase::Aborted);
    assert!(report.abort_reason.is_some());
    assert_eq!(report.urls_found, 0);
    assert_eq!(report.saved, 0);
    // Header-only file is still written
    assert!(read_rows(&report.output_path).is_empty());
}

#[tokio::test]
async fn test_batch_continues_past_failing_pair() {
    let server = MockServer::start().await;
    let base = server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a class="hit" href="{base}/news/only">only</a>"#
        )))
        .mount(&server)
        .await;
    mount_article(&server, "/news/only", "Only", "2023-03-03").await;

    let config = create_test_config(
        &out.path().display().to_string(),
        &format!(
            r#"
[[site]]
id = "batchpaper"
strategy = "direct"
joiner = "+"
template = "{base}/search?q={{keyword}}&page={{page}}"
anchor-class = "hit"
"#
        ),
    );

    let coordinator = Coordinator::new(config).unwrap();
    let sites = vec!["batchpaper".to_string()];
    let keywords = vec!["first".to_string(), " ".to_string(), "second".to_string()];
    let report = coordinator.auto(&sites, &keywords).await.unwrap();

    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.total_saved(), 2);
    assert!(out.path().join("batchpaper/batchpaper_first.csv").exists());
    assert!(out.path().join("batchpaper/batchpaper_second.csv").exists());
}

#[tokio::test]
async fn test_compact_is_idempotent_on_real_output() {
    let out = TempDir::new().unwrap();
    let sink = CsvSink::new(out.path());
    let path = sink.record_path("CNN", "gun+policy");

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "title,text,url,published_time\n\
         A,body,https://x/1,2021-01-01\n\
         A,body,https://x/1,2021-01-01\n\
         ,body,https://x/2,2021-01-01\n\
         B,N/A,https://x/3,2021-01-01\n\
         C,body,https://x/4,2021-01-02\n",
    )
    .unwrap();

    let first = sink.compact(&path).unwrap();
    assert_eq!(first.duplicates_removed, 1);
    assert_eq!(first.incomplete_removed, 2);
    assert_eq!(first.rows_after, 2);
    let after_first = fs::read_to_string(&path).unwrap();

    let second = sink.compact(&path).unwrap();
    assert_eq!(second.rows_before, 2);
    assert_eq!(second.rows_after, 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}
