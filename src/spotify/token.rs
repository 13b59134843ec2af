use chrono::{DateTime, Duration, Utc};

use crate::types::{AccessGrant, TokenState};

/// Holds the current token state of a session.
///
/// Mutations replace the whole [`TokenState`]; a failed refresh never
/// reaches the store, so readers cannot observe a half-updated token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    state: TokenState,
}

impl TokenStore {
    pub fn new(state: TokenState) -> Self {
        TokenStore { state }
    }

    pub fn empty() -> Self {
        TokenStore {
            state: TokenState::empty(),
        }
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    pub fn access_token(&self) -> Option<&str> {
        self.state.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.state.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.state.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state.is_expired(now)
    }

    /// True when the token is missing or expires within `margin` of `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        !self.state.is_authenticated() || self.state.is_expired(now + margin)
    }

    /// Swaps in a complete new state, as after a fresh login.
    pub fn replace(&mut self, state: TokenState) {
        self.state = state;
    }

    /// Applies a refresh grant. The current refresh token survives when the
    /// grant carries none.
    pub fn apply_grant(&mut self, grant: AccessGrant) {
        self.state = self.state.with_grant(grant);
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::empty()
    }
}
