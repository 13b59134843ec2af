use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use reqwest::{Client, header::AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    config,
    spotify::AuthError,
    types::{AccessGrant, Credentials, TokenState},
};

impl Credentials {
    /// `Basic base64(client_id:client_secret)` for the token endpoint.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Client for the authorization-code and refresh-token grants.
///
/// The grant flow is stateless per request: identity travels in the Basic
/// auth header and the form body, so the client only keeps the immutable
/// credentials and endpoint addresses.
pub struct AuthClient {
    http: Client,
    credentials: Credentials,
    token_url: String,
    authorize_url: String,
    redirect_uri: String,
    scope: String,
}

impl AuthClient {
    pub fn new(
        http: Client,
        credentials: Credentials,
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        AuthClient {
            http,
            credentials,
            token_url: token_url.into(),
            authorize_url: config::spotify_apiauth_url(),
            redirect_uri: redirect_uri.into(),
            scope: config::spotify_scope(),
        }
    }

    /// Builds a client against the configured Spotify account endpoints.
    pub fn from_config(http: Client, credentials: Credentials) -> Self {
        Self::new(
            http,
            credentials,
            config::spotify_apitoken_url(),
            config::spotify_redirect_uri(),
        )
    }

    pub fn with_authorize_url(mut self, authorize_url: impl Into<String>) -> Self {
        self.authorize_url = authorize_url.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Random value echoed back by the authorization server to tie the
    /// callback to this login attempt.
    pub fn generate_state() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect()
    }

    /// URL the user opens to grant access to the application.
    ///
    /// # Arguments
    ///
    /// * `state` - Value from [`generate_state`](Self::generate_state), checked
    ///   again when the callback arrives
    ///
    /// # Errors
    ///
    /// [`AuthError::Transport`] when the configured authorize URL cannot be
    /// turned into a request.
    pub fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let request = self
            .http
            .get(&self.authorize_url)
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ])
            .build()?;

        Ok(request.url().to_string())
    }

    /// Exchanges a one-time authorization code for an access/refresh pair.
    ///
    /// # Returns
    ///
    /// A fresh [`TokenState`] whose expiry is computed from `expires_in`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Rejected`] when the account service refuses the code
    /// - [`AuthError::Transport`] when the request cannot be sent
    /// - [`AuthError::MalformedResponse`] when the grant cannot be decoded
    pub async fn exchange_code(&self, auth_code: &str) -> Result<TokenState, AuthError> {
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", auth_code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;
        let issued_at = Utc::now();

        let access_token = require(response.access_token, "access_token")?;
        let refresh_token = require(response.refresh_token, "refresh_token")?;
        let expires_in = require(response.expires_in, "expires_in")?;

        let state = TokenState::issued(access_token, refresh_token, issued_at, expires_in);
        info!(expires_at = %state.expires_at, "authorization code exchanged");
        Ok(state)
    }

    /// Exchanges a refresh token for a new access token. The response may
    /// omit the refresh token, in which case the grant carries `None`.
    ///
    /// # Errors
    ///
    /// Same as [`exchange_code`](Self::exchange_code). A revoked refresh
    /// token shows up as [`AuthError::Rejected`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessGrant, AuthError> {
        let response = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;
        let issued_at = Utc::now();

        let grant = AccessGrant {
            access_token: require(response.access_token, "access_token")?,
            refresh_token: response.refresh_token,
            expires_in: require(response.expires_in, "expires_in")?,
            issued_at,
        };
        info!(
            expires_in = grant.expires_in,
            rotated = grant.refresh_token.is_some(),
            "access token refreshed"
        );
        Ok(grant)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        debug!(url = %self.token_url, grant_type = form[0].1, "requesting token");

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, AuthError> {
    value.ok_or_else(|| AuthError::MalformedResponse(format!("missing field '{field}'")))
}
