use std::collections::HashSet;

use crate::{
    error::{InsertFailure, SyncError},
    search::RetryPolicy,
    sync::PlaylistWriter,
    youtube::YouTubeClient,
};

pub const PLAYLIST_DESCRIPTION: &str = "Imported from Spotify";

/// Destination playlist writer. Every call goes through the same retry
/// policy as searches, since they draw from the same quota.
pub struct YouTubePlaylists<'a> {
    client: &'a YouTubeClient,
    policy: RetryPolicy,
}

impl<'a> YouTubePlaylists<'a> {
    pub fn new(client: &'a YouTubeClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }
}

impl PlaylistWriter for YouTubePlaylists<'_> {
    /// Reuses a playlist of the user with the same title, or creates a
    /// private one.
    async fn create_or_get_playlist(&self, name: &str) -> Result<String, SyncError> {
        let client = self.client;
        if let Some(existing) = self.policy.run(move || client.find_playlist(name)).await? {
            return Ok(existing.id);
        }

        self.policy
            .run(move || client.create_playlist(name, PLAYLIST_DESCRIPTION))
            .await
    }

    async fn list_existing_track_ids(&self, playlist_id: &str) -> Result<HashSet<String>, SyncError> {
        let client = self.client;
        self.policy
            .run(move || client.playlist_video_ids(playlist_id))
            .await
    }

    /// YouTube has no batch insert; items are added one request at a time.
    /// Stops at the first failure.
    async fn insert_tracks(
        &self,
        playlist_id: &str,
        destination_ids: &[String],
    ) -> Result<(), InsertFailure> {
        let client = self.client;
        for (inserted, video_id) in destination_ids.iter().enumerate() {
            self.policy
                .run(move || client.insert_playlist_item(playlist_id, video_id))
                .await
                .map_err(|error| InsertFailure { inserted, error })?;
        }
        Ok(())
    }
}
