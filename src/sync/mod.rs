//! # Playlist Synchronizer
//!
//! Drives the migration of one source playlist at a time. Every track goes
//! through
//!
//! ```text
//! Pending ─┬─> CacheHit ───────────────────────────> Resolved
//!          └─> Searching ─> Scored ─┬─> Resolved
//!                                   └─> Unresolved
//! ```
//!
//! A cached tombstone goes straight to Unresolved. Resolved ids are
//! deduplicated against the target playlist and against earlier tracks of
//! the run before they are inserted.
//!
//! This is the only place where a failure becomes a run-level decision:
//! quota exhaustion degrades the run (every later track is left unresolved
//! without searching), a fatal error aborts it, anything else only affects
//! the current track or video.

mod synchronizer;

use std::{collections::HashSet, future::Future};

use crate::{
    error::{InsertFailure, SyncError},
    types::SearchCandidate,
};

pub use synchronizer::INSERT_BATCH;
pub use synchronizer::Synchronizer;

/// Search side used by the synchronizer.
pub trait TrackSearch {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<SearchCandidate>, SyncError>>;
}

/// Destination playlist operations used by the synchronizer.
pub trait PlaylistWriter {
    fn create_or_get_playlist(&self, name: &str) -> impl Future<Output = Result<String, SyncError>>;

    fn list_existing_track_ids(
        &self,
        playlist_id: &str,
    ) -> impl Future<Output = Result<HashSet<String>, SyncError>>;

    /// Inserts `destination_ids` in order. On failure the error carries how
    /// many leading ids were added.
    fn insert_tracks(
        &self,
        playlist_id: &str,
        destination_ids: &[String],
    ) -> impl Future<Output = Result<(), InsertFailure>>;
}
