mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use repositories::domain::models::AggregatorConfig;
use repositories::{FetchAggregator, RepositoryRecord, RetryPolicy, UpstreamClient};
use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{mount_cycling, TestServer};

async fn start_over(mock_server: &MockServer) -> TestServer {
    let client = UpstreamClient::new(&mock_server.uri()).unwrap();
    let aggregator = FetchAggregator::with_config(
        Arc::new(client),
        RetryPolicy::new(2, 1, 5),
        &AggregatorConfig::default(),
    );
    TestServer::start(Arc::new(aggregator)).await
}

#[tokio::test]
async fn test_default_count_is_one() {
    let mock_server = MockServer::start().await;
    mount_cycling(&mock_server, vec![(1, "foo")]).await;
    let server = start_over(&mock_server).await;

    let response = reqwest::get(server.url("/repositories")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json")));

    let records: Vec<RepositoryRecord> = response.json().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "foo");

    server.stop().await;
}

#[tokio::test]
async fn test_response_uses_upstream_field_names() {
    let mock_server = MockServer::start().await;
    mount_cycling(&mock_server, vec![(5, "axum")]).await;
    let server = start_over(&mock_server).await;

    let body: serde_json::Value = reqwest::get(server.url("/repositories?count=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let items = body.as_array().expect("array body");
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item["id"], 5);
        assert_eq!(item["name"], "axum");
        assert!(item.get("fetchedAt").is_some());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_unique_request_returns_distinct_ids() {
    let mock_server = MockServer::start().await;
    mount_cycling(&mock_server, vec![(1, "foo"), (2, "bar"), (3, "baz")]).await;
    let server = start_over(&mock_server).await;

    let records: Vec<RepositoryRecord> =
        reqwest::get(server.url("/repositories?count=3&unique=true"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

    let ids: HashSet<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(ids.len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_parameters_are_bad_requests() {
    let mock_server = MockServer::start().await;
    mount_cycling(&mock_server, vec![(1, "foo")]).await;
    let server = start_over(&mock_server).await;

    for query in ["count=abc", "count=0", "count=-3", "timeout=soon"] {
        let response = reqwest::get(server.url(&format!("/repositories?{query}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "query {query}");
        assert!(!response.text().await.unwrap().is_empty());
    }

    server.stop().await;
}

#[tokio::test]
async fn test_non_get_is_rejected() {
    let mock_server = MockServer::start().await;
    let server = start_over(&mock_server).await;

    let response = reqwest::Client::new()
        .post(server.url("/repositories"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    server.stop().await;
}

#[tokio::test]
async fn test_upstream_failure_is_internal_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repository"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let server = start_over(&mock_server).await;

    let response = reqwest::get(server.url("/repositories?count=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = response.text().await.unwrap();
    assert!(body.contains("after 2 attempts"), "body: {body}");

    server.stop().await;
}

#[tokio::test]
async fn test_unrepresentable_timeout_is_served() {
    let mock_server = MockServer::start().await;
    mount_cycling(&mock_server, vec![(1, "foo")]).await;
    let server = start_over(&mock_server).await;

    let response = reqwest::get(server.url("/repositories?count=2&timeout=500000000000y"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let records: Vec<RepositoryRecord> = response.json().await.unwrap();
    assert_eq!(records.len(), 2);

    server.stop().await;
}

#[tokio::test]
async fn test_huge_count_does_not_take_the_server_down() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repository"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;
    let server = start_over(&mock_server).await;

    let response = reqwest::get(server.url(&format!(
        "/repositories?count={}&timeout=50ms",
        i64::MAX
    )))
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().await.unwrap().contains("deadline exceeded"));

    let response = reqwest::get(server.url("/repositories?timeout=50ms"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    server.stop().await;
}
