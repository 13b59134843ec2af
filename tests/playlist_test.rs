mod common;

use beatlist::spotify::{
    FetchError, PlaylistMutator,
    playlist::{self, MAX_TRACKS_PER_REQUEST},
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

use common::fetcher;

#[tokio::test]
async fn test_create_playlist() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/user-1/playlists"))
        .and(body_json(json!({ "name": "Running 170", "public": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "p1", "name": "Running 170" })))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let playlist = PlaylistMutator::new(&fetcher)
        .create("user-1", "Running 170")
        .await
        .unwrap();

    assert_eq!(playlist.playlist_id, "p1");
}

#[tokio::test]
async fn test_create_playlist_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/user-1/playlists"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);
    let err = PlaylistMutator::new(&fetcher)
        .create("user-1", "Nope")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Rejected { status: 403, .. }));
}

#[tokio::test]
async fn test_append_tracks_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/playlists/p1/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "s" })))
        .expect(3)
        .mount(&server)
        .await;

    let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:t{i}")).collect();
    let (fetcher, _) = fetcher(&server);
    PlaylistMutator::new(&fetcher)
        .append_tracks("p1", &uris)
        .await
        .unwrap();

    let sizes: Vec<usize> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["uris"].as_array().unwrap().len()
        })
        .collect();
    assert_eq!(sizes, vec![MAX_TRACKS_PER_REQUEST, MAX_TRACKS_PER_REQUEST, 50]);
}

#[tokio::test]
async fn test_append_nothing_sends_nothing() {
    let server = MockServer::start().await;

    let (fetcher, _) = fetcher(&server);
    PlaylistMutator::new(&fetcher)
        .append_tracks("p1", &[])
        .await
        .unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_playlist_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/user-1/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "p1", "name": "Chill" },
                { "id": "p2", "name": "Running" },
            ],
            "next": null,
        })))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);

    let found = playlist::find_playlist_id(&fetcher, "user-1", "Running").await.unwrap();
    assert_eq!(found.as_deref(), Some("p2"));

    let missing = playlist::find_playlist_id(&fetcher, "user-1", "Sleep").await.unwrap();
    assert_eq!(missing, None);

    assert!(playlist::playlist_exists(&fetcher, "user-1", "p1").await.unwrap());
}

#[tokio::test]
async fn test_find_on_rate_limited_listing_is_an_error() {
    let server = MockServer::start().await;
    let first_page: Vec<Value> = (0..50)
        .map(|i| json!({ "id": format!("p{i}"), "name": format!("List {i}") }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/users/user-1/playlists"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": first_page,
            "total": 80,
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/user-1/playlists"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(&server);

    let listed = playlist::list_user_playlists(&fetcher, "user-1").await.unwrap();
    assert_eq!(listed.len(), 50);
    assert!(listed.rate_limited);

    let found = playlist::find_playlist_id(&fetcher, "user-1", "List 3").await.unwrap();
    assert_eq!(found.as_deref(), Some("p3"));

    let err = playlist::find_playlist_id(&fetcher, "user-1", "List 70")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::RateLimitExceeded { retry_after: 7 }));
}
