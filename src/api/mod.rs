//! # API Module
//!
//! HTTP endpoints of the short-lived local server started by `beatlist auth`.
//!
//! - [`callback`] - receives Spotify's authorization redirect, checks the
//!   `state` parameter and hands the authorization code to the waiting command.
//! - [`health`] - reports status and version.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use beatlist::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
