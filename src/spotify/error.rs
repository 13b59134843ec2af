use thiserror::Error;

/// Failures of the token endpoint. Never retried beyond the refresh path.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Failures of an authenticated resource request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("rate limit exceeded, server asked to wait {retry_after} seconds")]
    RateLimitExceeded { retry_after: u64 },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no access token available, run `beatlist auth` first")]
    NotAuthenticated,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Multi-item loops stop on this and keep what they have.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimitExceeded { .. })
    }
}
