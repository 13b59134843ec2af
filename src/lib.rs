//! Audio-feature analysis of a Spotify library.
//!
//! `beatlist` collects the tracks of a source (liked songs, saved albums or
//! one playlist), looks up their audio features, keeps them in SQLite
//! tables and creates playlists from the tracks inside a feature band, for
//! example every track within 10% of 128 BPM.
//!
//! The library is split in two layers:
//!
//! - `spotify`, `management`, `analysis` and `utils` hold the operations.
//!   They return typed errors (`FetchError`, `StoreError`, ...) and report
//!   progress through `tracing` events only. Nothing is printed unless the
//!   binary installs a subscriber: `main` logs to stderr at `debug` with
//!   `--verbose`, otherwise as `RUST_LOG` says, falling back to `warn`.
//! - `cli` drives those operations for the `beatlist` binary. It talks to
//!   the user with the colored macros below, returns [`Res`] internally and
//!   ends a failed command with [`error!`], which exits the process.
//!
//! `api` and `server` serve the local OAuth callback during `beatlist auth`.
//! `config` reads the `.env` file of the data directory.

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed error result used by the `cli` layer, where every failure ends up
/// as a message for the user.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints a status line to stdout, marked with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```ignore
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a green `✓` line to stdout once a command has done its work.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line to stdout and exits with status 1.
///
/// Only the CLI layer uses it; library code returns errors instead.
///
/// ```ignore
/// if let Err(e) = store.drop_table(&name).await {
///     error!("Cannot drop table {}. Err: {}", name, e);
/// }
/// // not reached on error
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line to stdout for problems the command survives,
/// such as skipped tracks or a listing cut short by a rate limit.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
