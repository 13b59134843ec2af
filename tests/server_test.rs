use std::sync::Arc;

use beatlist::{server, types::AuthCallback};
use serde_json::Value;
use tokio::sync::Mutex;

async fn start(state: Arc<Mutex<Option<AuthCallback>>>) -> String {
    let listener = server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));
    format!("http://{addr}")
}

fn pending(state: &str) -> Arc<Mutex<Option<AuthCallback>>> {
    Arc::new(Mutex::new(Some(AuthCallback {
        state: state.to_string(),
        code: None,
    })))
}

#[tokio::test]
async fn test_callback_stores_code() {
    let state = pending("abc");
    let base = start(state.clone()).await;

    let response = reqwest::get(format!("{base}/callback?code=the-code&state=abc"))
        .await
        .unwrap();
    assert!(response.status().is_success());

    let callback = state.lock().await;
    assert_eq!(
        callback.as_ref().and_then(|c| c.code.as_deref()),
        Some("the-code")
    );
}

#[tokio::test]
async fn test_callback_with_wrong_state_is_ignored() {
    let state = pending("abc");
    let base = start(state.clone()).await;

    reqwest::get(format!("{base}/callback?code=the-code&state=evil"))
        .await
        .unwrap();

    let callback = state.lock().await;
    assert_eq!(callback.as_ref().and_then(|c| c.code.clone()), None);
}

#[tokio::test]
async fn test_callback_error_is_ignored() {
    let state = pending("abc");
    let base = start(state.clone()).await;

    reqwest::get(format!("{base}/callback?error=access_denied&state=abc"))
        .await
        .unwrap();

    let callback = state.lock().await;
    assert_eq!(callback.as_ref().and_then(|c| c.code.clone()), None);
}

#[tokio::test]
async fn test_health() {
    let base = start(pending("abc")).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "beatlist");
}
