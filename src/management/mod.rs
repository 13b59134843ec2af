mod auth;
mod credentials;
mod database;

pub use auth::{TokenCache, TokenCacheError};
pub use credentials::{CredentialError, CredentialStore};
pub use database::{StoreError, TrackStore};
