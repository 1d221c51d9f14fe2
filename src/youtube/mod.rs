//! # YouTube Integration Module
//!
//! Destination side of a migration, built on the YouTube Data API v3.
//!
//! - [`client`] - one-request-per-call HTTP client. Responses are parsed into
//!   explicit schemas and search hits are converted to
//!   [`SearchCandidate`](crate::types::SearchCandidate) here, so nothing
//!   downstream sees raw JSON.
//! - [`playlist`] - the [`PlaylistWriter`](crate::sync::PlaylistWriter)
//!   used by the synchronizer
//!
//! ## Quota
//!
//! Every project has a small daily quota; a search costs 100 units and a
//! playlist insert 50. Quota and rate-limit problems come back as 403 with
//! a reason such as `quotaExceeded`, or as 429, and are reported as
//! [`SyncError::RateLimited`](crate::error::SyncError::RateLimited) for the
//! retry policy to handle. Other 401/403 responses are fatal.
//!
//! Authorization uses the shared PKCE flow in [`crate::oauth`] with the
//! `youtube.force-ssl` scope and offline access.

pub mod client;
pub mod playlist;

pub use client::YouTubeClient;
pub use playlist::YouTubePlaylists;
