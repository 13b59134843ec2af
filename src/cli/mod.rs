//! # CLI Module
//!
//! Command implementations of beatlist. Each command resolves its inputs
//! (credentials, stored token, data source), delegates to the
//! [`crate::spotify`] access layer, the [`crate::management`] stores and
//! [`crate::analysis`], and reports progress with the console macros.
//!
//! ## Commands
//!
//! - [`auth`] - Authorization-code login through the browser and a local
//!   callback server
//! - [`credentials`] - Stores client ID and secret, discarding old tokens
//! - [`tracks`] - Collects tracks from liked songs, saved albums or a
//!   playlist, fetches their audio features and optionally saves them
//! - [`playlists`] - Lists the user's playlists
//! - [`stats`] - Mean and standard deviation of every numeric feature
//! - [`generate`] - Creates a playlist from tracks within a feature band
//! - [`list_tables`] / [`drop_table`] - Manage saved tables
//!
//! ## Usage Patterns
//!
//! ```bash
//! beatlist credentials --client-id <ID> --client-secret <SECRET>
//! beatlist auth
//! beatlist tracks --source liked --save
//! beatlist stats --table liked_tracks
//! beatlist generate --table liked_tracks --value 128 --name "Run 128"
//! ```
//!
//! Commands never prompt. Fatal problems end the process through
//! [`crate::error!`]; partial results (rate limits, tracks without
//! features) are reported with [`crate::warning!`].

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

mod auth;
mod credentials;
mod playlist;
mod stats;
mod tables;
mod tracks;

pub use auth::auth;
pub use credentials::credentials;
pub use playlist::generate;
pub use playlist::playlists;
pub use stats::stats;
pub use tables::drop_table;
pub use tables::list_tables;
pub use tracks::DataInput;
pub use tracks::Source;
pub use tracks::SourceKind;
pub use tracks::tracks;

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
