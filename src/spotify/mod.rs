//! # Spotify Integration Module
//!
//! Source side of a migration: reads playlists from the Spotify Web API.
//!
//! - [`playlist`] - playlist name and paginated track listing, converted to
//!   [`SourceTrack`](crate::types::SourceTrack) at this boundary
//!
//! Authorization goes through the shared PKCE flow in [`crate::oauth`] with
//! the `playlist-read-private` scope; tokens are kept by
//! [`TokenManager`](crate::management::TokenManager).
//!
//! ## Rate Limiting
//!
//! Spotify answers 429 with a `Retry-After` header. Requests wait for the
//! advertised delay when it is reasonable (up to two minutes) and give up
//! otherwise. 502 Bad Gateway responses are retried after a short pause.

pub mod playlist;

pub use playlist::SpotifyClient;
