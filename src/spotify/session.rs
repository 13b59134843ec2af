use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::{
    spotify::{AuthClient, AuthError, FetchError, RateLimitedFetcher, library},
    types::{TokenState, UserIdentity},
};

/// Tokens expiring within this window are refreshed ahead of use.
pub const REFRESH_MARGIN: Duration = Duration::seconds(60);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no refresh token stored, run `beatlist auth` again")]
    MissingRefreshToken,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Authenticated connection to the Web API.
///
/// Owns the grant client and the fetcher (which in turn owns the token
/// store) and caches the user identity once it has been fetched.
pub struct Session {
    auth: AuthClient,
    fetcher: RateLimitedFetcher,
    user: Option<UserIdentity>,
}

impl Session {
    pub fn new(auth: AuthClient, fetcher: RateLimitedFetcher) -> Self {
        Session {
            auth,
            fetcher,
            user: None,
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn fetcher(&self) -> &RateLimitedFetcher {
        &self.fetcher
    }

    pub fn token(&self) -> &TokenState {
        self.fetcher.tokens().state()
    }

    /// Completes a fresh login and replaces whatever token was held.
    ///
    /// # Errors
    ///
    /// Any [`AuthError`] of the code exchange. The previous token is kept.
    pub async fn login(&mut self, auth_code: &str) -> Result<&TokenState, AuthError> {
        let state = self.auth.exchange_code(auth_code).await?;
        self.fetcher.tokens_mut().replace(state);
        self.user = None;
        Ok(self.token())
    }

    /// Refreshes the access token when it is expired or about to expire.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - The token was refreshed and should be persisted
    /// - `Ok(false)` - The token is still valid past the refresh margin
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingRefreshToken`] when there is nothing to refresh
    ///   with
    /// - [`SessionError::Auth`] when the refresh grant fails
    ///
    /// On failure the stored token is left untouched.
    pub async fn ensure_valid_token(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        if !self.fetcher.tokens().needs_refresh(now, REFRESH_MARGIN) {
            return Ok(false);
        }

        let refresh_token = self
            .fetcher
            .tokens()
            .refresh_token()
            .ok_or(SessionError::MissingRefreshToken)?
            .to_string();

        let grant = self.auth.refresh(&refresh_token).await?;
        self.fetcher.tokens_mut().apply_grant(grant);
        Ok(true)
    }

    /// The authenticated user, fetched on first use.
    ///
    /// # Errors
    ///
    /// Errors of [`current_user`](crate::spotify::library::current_user).
    /// Nothing is cached on failure.
    pub async fn user(&mut self) -> Result<&UserIdentity, FetchError> {
        let user = match self.user.take() {
            Some(user) => user,
            None => library::current_user(&self.fetcher).await?,
        };
        Ok(self.user.insert(user))
    }
}
