use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// Client credentials of the registered Spotify application.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Access and refresh token together with their validity window.
///
/// `expires_at` is always `issued_at + expires_in` of the last successful
/// token or refresh response. A state without an access token has never
/// been authenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenState {
    pub fn empty() -> Self {
        let now = Utc::now();
        Self {
            access_token: None,
            refresh_token: None,
            issued_at: now,
            expires_at: now,
        }
    }

    pub fn issued(
        access_token: String,
        refresh_token: String,
        issued_at: DateTime<Utc>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            issued_at,
            expires_at: expiry(issued_at, expires_in),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Equal instants are not expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns the state after applying a refresh grant. A grant without
    /// a refresh token keeps the one already held.
    pub fn with_grant(&self, grant: AccessGrant) -> Self {
        Self {
            access_token: Some(grant.access_token),
            refresh_token: grant.refresh_token.or_else(|| self.refresh_token.clone()),
            issued_at: grant.issued_at,
            expires_at: expiry(grant.issued_at, grant.expires_in),
        }
    }
}

fn expiry(issued_at: DateTime<Utc>, expires_in: u64) -> DateTime<Utc> {
    let lifetime = i64::try_from(expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX);
    issued_at
        .checked_add_signed(lifetime)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Result of a refresh-token exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub playlist_id: String,
}

/// Offset bookkeeping for one paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub offset: u32,
    pub page_size: u32,
    pub exhausted: bool,
}

impl PaginationCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            offset: 0,
            page_size,
            exhausted: false,
        }
    }

    /// Moves past a page of `received` items. A short or empty page
    /// exhausts the cursor.
    pub fn advance(&mut self, received: u32) {
        self.offset += received;
        if received < self.page_size {
            self.exhausted = true;
        }
    }

    pub fn finish(&mut self) {
        self.exhausted = true;
    }
}

/// Audio feature record of a single track as returned by the API.
///
/// The record is kept as an opaque map; only `id` and `uri` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct TrackFeatureRecord {
    fields: Map<String, Value>,
}

impl TrackFeatureRecord {
    pub fn id(&self) -> &str {
        self.fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn uri(&self) -> &str {
        self.fields
            .get("uri")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Map<String, Value>> for TrackFeatureRecord {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for key in ["id", "uri"] {
            match fields.get(key).and_then(Value::as_str) {
                Some(v) if !v.is_empty() => {}
                _ => return Err(format!("feature record is missing required key '{key}'")),
            }
        }
        Ok(Self { fields })
    }
}

impl TryFrom<Value> for TrackFeatureRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(format!("feature record is not an object: {other}")),
        }
    }
}

impl From<TrackFeatureRecord> for Map<String, Value> {
    fn from(record: TrackFeatureRecord) -> Self {
        record.fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    pub id: String,
}

#[derive(Tabled)]
pub struct StatsTableRow {
    pub parameter: String,
    pub mean: String,
    pub stdev: String,
}

/// OAuth callback data handed from the local callback server to `auth`.
#[derive(Debug, Clone)]
pub struct AuthCallback {
    pub state: String,
    pub code: Option<String>,
}
