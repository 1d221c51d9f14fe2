use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    error::SyncError,
    types::{PlaylistTracksPage, SourceTrack, SpotifyPlaylist},
    warning,
};

const PAGE_SIZE: u32 = 100;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const MAX_ATTEMPTS: u32 = 5;

const TRACK_FIELDS: &str =
    "items(is_local,track(id,name,type,artists(name),album(name))),next,total";

/// Read-only client for Spotify playlists.
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(client: Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Returns the playlist name and its tracks in playlist order.
    ///
    /// Podcast episodes are skipped. Local files have no Spotify id but are
    /// kept, since their metadata is still searchable.
    pub async fn get_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<(String, Vec<SourceTrack>), SyncError> {
        let playlist: SpotifyPlaylist = self
            .get_json(&format!(
                "{}/playlists/{}?fields=id,name",
                self.base_url, playlist_id
            ))
            .await?;

        let mut tracks = Vec::new();
        let mut next = Some(format!(
            "{}/playlists/{}/tracks?limit={}&fields={}",
            self.base_url, playlist_id, PAGE_SIZE, TRACK_FIELDS
        ));

        while let Some(url) = next {
            let page: PlaylistTracksPage = self.get_json(&url).await?;
            for item in page.items {
                let Some(track) = item.track else {
                    continue;
                };
                if track.kind.as_deref() == Some("episode") {
                    continue;
                }

                let source_id = match track.id {
                    Some(id) if !item.is_local => id,
                    _ => format!("local:{}", tracks.len()),
                };
                tracks.push(SourceTrack {
                    artist: track
                        .artists
                        .first()
                        .map(|a| a.name.clone())
                        .unwrap_or_default(),
                    title: track.name,
                    album: track.album.map(|a| a.name).filter(|n| !n.is_empty()),
                    source_id,
                });
            }
            next = page.next;
        }

        Ok((playlist.name, tracks))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SyncError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .client
                .get(url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json::<T>()
                    .await
                    .map_err(|e| SyncError::Transient(format!("Malformed Spotify response: {}", e)));
            }

            if attempt < MAX_ATTEMPTS {
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after = retry_after_secs(&response).unwrap_or(1);
                    if retry_after <= MAX_RETRY_AFTER_SECS {
                        sleep(Duration::from_secs(retry_after)).await;
                        continue;
                    }
                    warning!(
                        "Spotify asks to retry after {} seconds. Try again later.",
                        retry_after
                    );
                } else if status == StatusCode::BAD_GATEWAY {
                    sleep(Duration::from_secs(10)).await;
                    continue;
                }
            }

            return Err(match status {
                StatusCode::NOT_FOUND => SyncError::Transient("playlist not found".to_string()),
                StatusCode::TOO_MANY_REQUESTS => SyncError::Transient(status.to_string()),
                s => SyncError::from_status(s, None, None),
            });
        }
    }
}

fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
