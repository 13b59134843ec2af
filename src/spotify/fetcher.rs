use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, header::RETRY_AFTER};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{config, spotify::FetchError, spotify::TokenStore};

/// Delay used when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: u64 = 1;

/// Suspension point used while backing off from a rate limit.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Yields to the tokio scheduler instead of blocking the thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Issues authenticated requests against the Web API.
///
/// A 429 response is retried exactly once after the delay announced in
/// `Retry-After`; a second 429 surfaces as [`FetchError::RateLimitExceeded`]
/// so that callers stop their loops instead of hammering the service.
/// Every other non-2xx status is returned as [`FetchError::Rejected`].
pub struct RateLimitedFetcher {
    http: Client,
    api_url: String,
    tokens: TokenStore,
    sleeper: Arc<dyn Sleeper>,
    max_retry_after: u64,
}

impl RateLimitedFetcher {
    pub fn new(http: Client, api_url: impl Into<String>, tokens: TokenStore) -> Self {
        RateLimitedFetcher {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
            sleeper: Arc::new(TokioSleeper),
            max_retry_after: config::max_retry_after(),
        }
    }

    /// Replaces the tokio sleeper, mostly to observe back-off in tests.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Longest `Retry-After` the fetcher is willing to wait for. Longer
    /// announced delays fail immediately with `RateLimitExceeded`.
    pub fn with_max_retry_after(mut self, seconds: u64) -> Self {
        self.max_retry_after = seconds;
        self
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut TokenStore {
        &mut self.tokens
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sends one request and interprets its status.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method of the request
    /// * `endpoint` - Path relative to the API base URL, or an absolute URL
    /// * `params` - Query parameters
    /// * `body` - JSON body, if any
    ///
    /// # Returns
    ///
    /// The decoded JSON body of a 2xx response. An empty body yields
    /// `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::NotAuthenticated`] when the token store holds no
    ///   access token; nothing is sent
    /// - [`FetchError::RateLimitExceeded`] when the retry after a 429 is
    ///   rate limited again, or the announced delay exceeds the configured
    ///   maximum
    /// - [`FetchError::Rejected`] for any other non-2xx status
    /// - [`FetchError::Transport`] when the request cannot be sent
    /// - [`FetchError::MalformedResponse`] when a 2xx body is not JSON
    pub async fn fetch(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, FetchError> {
        let url = self.resolve(endpoint);

        let response = self.send(&method, &url, params, body).await?;
        let response = if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_seconds(&response);
            if retry_after > self.max_retry_after {
                warn!(
                    url = %url,
                    retry_after,
                    "rate limit delay above {} seconds, giving up",
                    self.max_retry_after
                );
                return Err(FetchError::RateLimitExceeded { retry_after });
            }

            warn!(url = %url, retry_after, "rate limited, retrying once");
            self.sleeper.sleep(Duration::from_secs(retry_after)).await;

            let retried = self.send(&method, &url, params, body).await?;
            if retried.status() == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_seconds(&retried);
                warn!(url = %url, retry_after, "still rate limited after retry");
                return Err(FetchError::RateLimitExceeded { retry_after });
            }
            retried
        } else {
            response
        };

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(url = %url, status = status.as_u16(), "request rejected");
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| FetchError::MalformedResponse(e.to_string()))
    }

    /// `GET` shorthand for [`fetch`](Self::fetch).
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        self.fetch(Method::GET, endpoint, params, None).await
    }

    /// `POST` shorthand for [`fetch`](Self::fetch) with a JSON body.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, FetchError> {
        self.fetch(Method::POST, endpoint, &[], Some(body)).await
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response, FetchError> {
        let token = self.tokens.access_token().ok_or(FetchError::NotAuthenticated)?;

        debug!(method = %method, url = %url, "sending request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token)
            .query(params);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!(
                "{base}/{path}",
                base = self.api_url,
                path = endpoint.trim_start_matches('/')
            )
        }
    }
}

fn retry_after_seconds(response: &Response) -> u64 {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
}
