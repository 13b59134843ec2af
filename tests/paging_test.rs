mod common;

use beatlist::spotify::{FetchError, PaginatedCollector, library};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use common::{fetcher, requested_offsets};

fn track_page(range: std::ops::Range<usize>, total: usize, last: bool) -> Value {
    let items: Vec<Value> = range
        .map(|i| json!({ "track": { "id": format!("t{i}") } }))
        .collect();
    json!({
        "items": items,
        "total": total,
        "next": if last { Value::Null } else { json!("https://api.example/next") },
    })
}

async fn mount_page(server: &MockServer, endpoint: &str, offset: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("offset", offset))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_collects_pages_until_short_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/me/tracks", "0", track_page(0..50, 73, false)).await;
    mount_page(&server, "/me/tracks", "50", track_page(50..73, 73, true)).await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::saved_track_ids(&fetcher).await.unwrap();

    let expected: Vec<String> = (0..73).map(|i| format!("t{i}")).collect();
    assert_eq!(ids.items, expected);
    assert!(!ids.rate_limited);
    assert_eq!(requested_offsets(&server).await, vec!["0", "50"]);
}

#[tokio::test]
async fn test_sends_limit_with_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_page(0..3, 3, true)))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::saved_track_ids(&fetcher).await.unwrap();

    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_exact_multiple_stops_on_last_page_marker() {
    let server = MockServer::start().await;
    mount_page(&server, "/me/tracks", "0", track_page(0..50, 100, false)).await;
    mount_page(&server, "/me/tracks", "50", track_page(50..100, 100, true)).await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::saved_track_ids(&fetcher).await.unwrap();

    assert_eq!(ids.len(), 100);
    assert_eq!(requested_offsets(&server).await, vec!["0", "50"]);
}

#[tokio::test]
async fn test_exact_multiple_stops_on_total() {
    let server = MockServer::start().await;
    let page = |range: std::ops::Range<usize>| {
        let items: Vec<Value> = range.map(|i| json!({ "id": format!("a{i}") })).collect();
        json!({ "items": items, "total": 100 })
    };
    mount_page(&server, "/albums/x/tracks", "0", page(0..50)).await;
    mount_page(&server, "/albums/x/tracks", "50", page(50..100)).await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::album_track_ids(&fetcher, &["x"]).await.unwrap();

    assert_eq!(ids.len(), 100);
    assert!(!ids.rate_limited);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_collection_takes_one_request() {
    let server = MockServer::start().await;
    mount_page(&server, "/me/albums", "0", json!({ "items": [], "total": 0, "next": null })).await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::library_album_ids(&fetcher).await.unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_items_without_id_are_skipped() {
    let server = MockServer::start().await;
    let body = json!({
        "items": [
            { "track": { "id": "t1" } },
            { "track": null },
            { "track": { "id": "t2" } },
        ],
        "next": null,
    });
    mount_page(&server, "/playlists/p1/tracks", "0", body).await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::playlist_track_ids(&fetcher, "p1").await.unwrap();

    assert_eq!(ids.items, vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_rate_limit_returns_partial_collection() {
    let server = MockServer::start().await;
    mount_page(&server, "/me/tracks", "0", track_page(0..50, 120, false)).await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(2)
        .mount(&server)
        .await;

    let (fetcher, sleeper) = fetcher(&server);
    let ids = library::saved_track_ids(&fetcher).await.unwrap();

    assert_eq!(ids.len(), 50);
    assert_eq!(ids.items.first().map(String::as_str), Some("t0"));
    assert!(ids.rate_limited);
    assert_eq!(ids.retry_after, Some(0));
    assert_eq!(sleeper.delays().len(), 1);
}

#[tokio::test]
async fn test_rejected_page_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/tracks"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let err = library::saved_track_ids(&fetcher).await.unwrap_err();

    assert!(matches!(err, FetchError::Rejected { status: 401, .. }));
}

#[tokio::test]
async fn test_page_without_items_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/custom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 3 })))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let err = PaginatedCollector::new(&fetcher)
        .collect("/custom", 10, |item| item.as_str().map(str::to_string))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_rejected_album_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/albums/gone/tracks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/albums/ok/tracks",
        "0",
        json!({ "items": [{ "id": "a1" }, { "id": "a2" }], "next": null }),
    )
    .await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::album_track_ids(&fetcher, &["gone", "ok"]).await.unwrap();

    assert_eq!(ids.items, vec!["a1", "a2"]);
    assert!(!ids.rate_limited);
}

#[tokio::test]
async fn test_rate_limited_album_stops_the_walk() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/albums/first/tracks",
        "0",
        json!({ "items": [{ "id": "f1" }], "next": null }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/albums/a/tracks"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/albums/b/tracks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "id": "b1" }], "next": null })),
        )
        .expect(0)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let ids = library::album_track_ids(&fetcher, &["first", "a", "b"])
        .await
        .unwrap();

    assert_eq!(ids.items, vec!["f1"]);
    assert!(ids.rate_limited);
    assert_eq!(ids.retry_after, Some(1));

    let paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["/albums/first/tracks", "/albums/a/tracks", "/albums/a/tracks"]
    );
}

#[tokio::test]
async fn test_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "user-1" })))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let user = library::current_user(&fetcher).await.unwrap();

    assert_eq!(user.user_id, "user-1");
}
