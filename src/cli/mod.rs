//! # CLI Module
//!
//! User-facing commands of spytcli. Each command loads what it needs
//! (settings, tokens, the candidate cache), delegates to the service clients
//! and the synchronizer, and reports through the console macros.
//!
//! - [`auth`] - OAuth authorization with Spotify or YouTube
//! - [`convert`] - Migrates one or more Spotify playlists to YouTube
//! - [`cache`] - Shows statistics of the candidate cache
//!
//! ```bash
//! spytcli auth spotify
//! spytcli auth youtube
//! spytcli convert 37i9dQZF1DXcBWIGoYBM5M https://open.spotify.com/playlist/...
//! spytcli cache
//! ```
//!
//! Only fatal errors terminate the program. A playlist that cannot be read
//! is skipped, and tracks that stay unresolved are appended to the failure
//! report instead.

mod auth;
mod cache;
mod convert;

pub use auth::auth;
pub use cache::cache;
pub use convert::ConvertOptions;
pub use convert::convert;
