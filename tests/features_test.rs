mod common;

use beatlist::spotify::{FeatureFetcher, FetchError};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::{feature_json, fetcher};

async fn mount_feature(server: &MockServer, id: &str, tempo: f64) {
    Mock::given(method("GET"))
        .and(path(format!("/audio-features/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_json(id, tempo)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_one_returns_record() {
    let server = MockServer::start().await;
    mount_feature(&server, "a", 128.0).await;

    let (fetcher, _) = fetcher(&server);
    let record = FeatureFetcher::new(&fetcher).fetch_one("a").await.unwrap();

    assert_eq!(record.id(), "a");
    assert_eq!(record.uri(), "spotify:track:a");
    assert_eq!(record.get("tempo"), Some(&json!(128.0)));
}

#[tokio::test]
async fn test_fetch_one_requires_id_and_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audio-features/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a", "tempo": 90.0 })))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let err = FeatureFetcher::new(&fetcher).fetch_one("a").await.unwrap_err();

    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_failed_lookup_is_skipped() {
    let server = MockServer::start().await;
    mount_feature(&server, "a", 100.0).await;
    Mock::given(method("GET"))
        .and(path("/audio-features/b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_feature(&server, "c", 140.0).await;

    let (fetcher, _) = fetcher(&server);
    let batch = FeatureFetcher::new(&fetcher)
        .fetch_all(&["a", "b", "c"])
        .await;

    let ids: Vec<&str> = batch.records.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert_eq!(batch.omitted, vec!["b"]);
    assert_eq!(batch.requested, 3);
    assert!(!batch.rate_limited);
    assert_eq!(batch.unattempted(), 0);
}

#[tokio::test]
async fn test_rate_limit_stops_the_loop() {
    let server = MockServer::start().await;
    mount_feature(&server, "a", 100.0).await;
    Mock::given(method("GET"))
        .and(path("/audio-features/b"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .mount(&server)
        .await;
    mount_feature(&server, "c", 140.0).await;

    let (fetcher, _) = fetcher(&server);
    let batch = FeatureFetcher::new(&fetcher)
        .fetch_all(&["a", "b", "c"])
        .await;

    assert_eq!(batch.retrieved(), 1);
    assert!(batch.rate_limited);
    assert!(batch.omitted.is_empty());
    assert_eq!(batch.unattempted(), 2);

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert!(!paths.contains(&"/audio-features/c".to_string()));
}

#[tokio::test]
async fn test_empty_input_sends_nothing() {
    let server = MockServer::start().await;

    let (fetcher, _) = fetcher(&server);
    let batch = FeatureFetcher::new(&fetcher)
        .fetch_all::<String>(&[])
        .await;

    assert_eq!(batch.retrieved(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
