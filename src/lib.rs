//! spytcli library
//!
//! Migrates Spotify playlists to YouTube. Tracks are read from Spotify,
//! matched against YouTube search results with a fuzzy scorer, and the
//! matches are written into a playlist of the same name. Search results are
//! cached on disk so reruns cost no quota for tracks that were already
//! looked up.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback server
//! - `cli` - Command implementations
//! - `config` - Environment variables and tunables
//! - `error` - The error type shared by clients and the synchronizer
//! - `management` - Persistent tokens, the candidate cache and the failure report
//! - `matching` - Query normalization and candidate scoring
//! - `oauth` - Authorization code flow with PKCE for both services
//! - `search` - Quota-aware search with retry and backoff
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client (source)
//! - `sync` - The per-playlist synchronizer
//! - `types` - Domain types and wire schemas
//! - `utils` - Small helpers
//! - `youtube` - YouTube Data API client (destination)

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod matching;
pub mod oauth;
pub mod search;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;
pub mod youtube;

/// Prints an informational line prefixed with a blue `o`.
///
/// Takes the same arguments as `println!`.
///
/// ```
/// info!("Reading playlist {}", playlist_id);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line prefixed with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error to stderr and exits with status 1.
///
/// Only for failures the program cannot recover from: missing credentials,
/// rejected tokens, fatal service errors. Everything after the call is
/// unreachable.
///
/// ```
/// error!("Cannot load environment: {}", e);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning to stderr. The program keeps running.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
