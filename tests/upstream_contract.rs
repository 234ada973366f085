//! Contract tests for the collector against a mock reporting portal.
//!
//! These run the real reqwest transport end to end: handshake GET, CSRF
//! header echo, form-encoded POST and response interpretation.

use chrono::NaiveDate;
use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;
use ward_report::model::QueryWindow;
use ward_report::{Collector, Config, FetchError};

const ENDPOINT_PATH: &str = "/ptis/report/dailyCollection";

const HANDSHAKE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta name="_csrf" content="tok-123"/>
    <meta name="_csrf_header" content="X-CSRF-TOKEN"/>
</head>
<body>Daily Collection</body>
</html>"#;

const RECORDS_BODY: &str = r#"[
    {"secretariatWard":"5","totalAmount":100,"consumerName":"A","consumerCode":"C1","receiptNumber":"R1","receiptDate":"2025-04-09","cityName":"Tirupati","id":1},
    {"secretariatWard":"5","totalAmount":50,"consumerName":"B","consumerCode":"C2","receiptNumber":"R2","receiptDate":"2025-04-09","cityName":"Tirupati","id":2},
    {"secretariatWard":"7","totalAmount":25,"consumerName":"D","consumerCode":"C3","receiptNumber":"R3","receiptDate":"2025-04-09","cityName":"Tirupati","id":3}
]"#;

async fn collector_for(server: &ServerGuard) -> (TempDir, Collector) {
    let dir = TempDir::new().unwrap();
    let endpoint = format!("{}{}", server.url(), ENDPOINT_PATH);
    let config = Config::create(dir.path(), Some(&endpoint), None)
        .await
        .unwrap();
    (dir, Collector::new(config))
}

fn window() -> QueryWindow {
    QueryWindow::single_day(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap())
}

#[tokio::test]
async fn fetches_and_groups_through_the_csrf_handshake() {
    let mut server = Server::new_async().await;
    let handshake = server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    let data = server
        .mock("POST", ENDPOINT_PATH)
        .match_header("x-csrf-token", "tok-123")
        .match_header("x-requested-with", "XMLHttpRequest")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("fromDate".into(), "09/04/2025".into()),
            Matcher::UrlEncoded("toDate".into(), "09/04/2025".into()),
            Matcher::UrlEncoded("revenueWard".into(), "".into()),
            Matcher::UrlEncoded("collectionMode".into(), "".into()),
            Matcher::UrlEncoded("collectionOperator".into(), "".into()),
            Matcher::UrlEncoded("status".into(), "".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(RECORDS_BODY)
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let report = collector.fetch_and_group(&window()).await.unwrap();

    assert_eq!(report.len(), 2);
    let five = report.get("5").unwrap();
    assert_eq!(five.count, 2);
    assert_eq!(five.total_amount, 150.0);
    assert_eq!(five.owners, vec!["A (C1)", "B (C2)"]);
    assert_eq!(report.get("7").unwrap().total_amount, 25.0);

    handshake.assert_async().await;
    data.assert_async().await;
}

#[tokio::test]
async fn missing_csrf_tags_fail_before_the_post() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body("<html><head><title>maintenance</title></head></html>")
        .create_async()
        .await;
    let post = server
        .mock("POST", ENDPOINT_PATH)
        .expect(0)
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let err = collector.fetch_and_group(&window()).await.unwrap_err();

    assert!(matches!(err, FetchError::TokenMissing));
    assert_eq!(err.to_string(), "CSRF token not found");
    post.assert_async().await;
}

#[tokio::test]
async fn upstream_500_preserves_the_status_code() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT_PATH)
        .with_status(500)
        .with_body("Internal Server Error")
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let err = collector.fetch_and_group(&window()).await.unwrap_err();

    assert!(matches!(err, FetchError::UpstreamStatus(500)));
    assert_eq!(err.to_string(), "Failed to fetch data: 500");
}

#[tokio::test]
async fn non_json_200_is_a_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT_PATH)
        .with_body("<html>session expired</html>")
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let err = collector.fetch_and_group(&window()).await.unwrap_err();
    assert!(matches!(err, FetchError::ResponseParse(_)));
}

#[tokio::test]
async fn non_array_json_is_an_unexpected_format() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT_PATH)
        .with_body(r#"{"message":"use the web ui"}"#)
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let err = collector.fetch_and_group(&window()).await.unwrap_err();
    assert!(matches!(err, FetchError::UnexpectedFormat));
    assert_eq!(
        err.to_string(),
        "Unexpected data format received from server"
    );
}

#[tokio::test]
async fn empty_array_yields_an_empty_report() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    server
        .mock("POST", ENDPOINT_PATH)
        .with_body("[]")
        .create_async()
        .await;

    let (_dir, collector) = collector_for(&server).await;
    let report = collector.fetch_and_group(&window()).await.unwrap();
    assert!(report.is_empty());
    assert_eq!(serde_json::to_string(&report).unwrap(), "{}");
}

#[tokio::test]
async fn configured_ward_filter_reaches_the_form() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", ENDPOINT_PATH)
        .with_body(HANDSHAKE_PAGE)
        .create_async()
        .await;
    let post = server
        .mock("POST", ENDPOINT_PATH)
        .match_body(Matcher::UrlEncoded(
            "revenueWard".into(),
            "Revenue Ward No 18".into(),
        ))
        .with_body("[]")
        .create_async()
        .await;

    let dir = TempDir::new().unwrap();
    let endpoint = format!("{}{}", server.url(), ENDPOINT_PATH);
    let config = Config::create(dir.path(), Some(&endpoint), Some("Revenue Ward No 18"))
        .await
        .unwrap();
    Collector::new(config)
        .fetch_and_group(&window())
        .await
        .unwrap();
    post.assert_async().await;
}
