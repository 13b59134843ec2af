#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use beatlist::{
    spotify::{RateLimitedFetcher, Sleeper, TokenStore},
    types::{TokenState, TrackFeatureRecord},
};
use chrono::Utc;
use reqwest::Client;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Sleeper that records requested delays instead of waiting.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn valid_token() -> TokenState {
    TokenState::issued("access".to_string(), "refresh".to_string(), Utc::now(), 3600)
}

/// Fetcher pointed at the mock server with a valid token and a recording
/// sleeper.
pub fn fetcher(server: &MockServer) -> (RateLimitedFetcher, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let fetcher = RateLimitedFetcher::new(Client::new(), server.uri(), TokenStore::new(valid_token()))
        .with_sleeper(sleeper.clone())
        .with_max_retry_after(120);
    (fetcher, sleeper)
}

pub fn feature_json(id: &str, tempo: f64) -> Value {
    json!({
        "id": id,
        "uri": format!("spotify:track:{id}"),
        "type": "audio_features",
        "tempo": tempo,
        "energy": 0.5,
        "danceability": 0.7,
    })
}

pub fn record(id: &str, tempo: f64) -> TrackFeatureRecord {
    TrackFeatureRecord::try_from(feature_json(id, tempo)).unwrap()
}

/// Offsets of every request the server received, in order.
pub async fn requested_offsets(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "offset")
                .map(|(_, v)| v.into_owned())
        })
        .collect()
}
