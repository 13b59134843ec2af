//! # Spotify Integration Module
//!
//! The resilient access layer between beatlist and the Spotify Web API:
//! token lifecycle, rate-limit aware requests, paginated collection of
//! track identifiers, audio feature lookups and playlist mutation.
//!
//! ## Architecture
//!
//! ```text
//! Session
//!     ├── AuthClient            (POST /api/token, Basic auth)
//!     └── RateLimitedFetcher    (Bearer auth, single 429 retry)
//!             └── TokenStore
//!
//! PaginatedCollector ─┐
//! FeatureFetcher ─────┼──> RateLimitedFetcher
//! PlaylistMutator ────┘
//! ```
//!
//! All calls are sequential. Parallel requests would only trip the
//! per-token rate limit sooner.
//!
//! ## Failure policy
//!
//! - Token endpoint failures ([`AuthError`]) are fatal for the calling
//!   operation and never retried beyond the refresh path.
//! - A 429 is retried once after `Retry-After`; a second 429 becomes
//!   [`FetchError::RateLimitExceeded`].
//! - Multi-item loops ([`PaginatedCollector`], [`FeatureFetcher`],
//!   [`library::album_track_ids`]) keep partial results on a rate limit,
//!   flag them ([`Collected::rate_limited`], [`FeatureBatch::rate_limited`])
//!   and log how much work was lost. Callers chaining walks stop at the flag.
//! - Single-shot mutations ([`PlaylistMutator`]) surface errors verbatim.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let auth = AuthClient::from_config(http.clone(), credentials);
//! let fetcher = RateLimitedFetcher::new(http, config::spotify_apiurl(), TokenStore::new(state));
//! let mut session = Session::new(auth, fetcher);
//!
//! session.ensure_valid_token(Utc::now()).await?;
//! let ids = library::saved_track_ids(session.fetcher()).await?;
//! let batch = FeatureFetcher::new(session.fetcher()).fetch_all(&ids).await;
//! ```

mod auth;
mod error;
mod features;
mod fetcher;
mod paging;
mod session;
mod token;

pub mod library;
pub mod playlist;

pub use auth::AuthClient;
pub use error::{AuthError, FetchError};
pub use features::{FeatureBatch, FeatureFetcher};
pub use fetcher::{DEFAULT_RETRY_AFTER, RateLimitedFetcher, Sleeper, TokioSleeper};
pub use paging::{Collected, PaginatedCollector};
pub use playlist::PlaylistMutator;
pub use session::{REFRESH_MARGIN, Session, SessionError};
pub use token::TokenStore;
