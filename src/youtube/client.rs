use std::{collections::HashSet, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::{
    error::SyncError,
    search::SearchTransport,
    types::{
        CreateYtPlaylistRequest, InsertYtPlaylistItemRequest, InsertYtPlaylistItemSnippet,
        SearchCandidate, YtErrorResponse, YtPlaylist, YtPlaylistItemListResponse,
        YtPlaylistListResponse, YtPlaylistSnippet, YtPrivacyStatus, YtSearchItem,
        YtSearchResponse, YtVideoResource,
    },
    utils,
};

const PAGE_SIZE: u32 = 50;

/// Auto-generated "Artist - Topic" channels and "ArtistVEVO" channels.
static CHANNEL_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\s+-\s+topic|\s*vevo)$").expect("valid channel suffix pattern")
});

/// Thin YouTube Data API v3 client. Every method performs exactly one HTTP
/// request per page; retries belong to the callers.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    token: String,
}

impl YouTubeClient {
    pub fn new(client: Client, base_url: &str, token: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Finds a playlist of the authenticated user by exact title.
    pub async fn find_playlist(&self, title: &str) -> Result<Option<YtPlaylist>, SyncError> {
        let page_size = PAGE_SIZE.to_string();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/playlists", self.base_url))
                .query(&[
                    ("part", "snippet"),
                    ("mine", "true"),
                    ("maxResults", page_size.as_str()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: YtPlaylistListResponse = self.send_json(request).await?;
            if let Some(found) = page.items.into_iter().find(|p| p.snippet.title == title) {
                return Ok(Some(found));
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(None),
            }
        }
    }

    /// Creates a private playlist and returns its id.
    pub async fn create_playlist(&self, title: &str, description: &str) -> Result<String, SyncError> {
        let body = CreateYtPlaylistRequest {
            snippet: YtPlaylistSnippet {
                title: title.to_string(),
                description: description.to_string(),
            },
            status: YtPrivacyStatus {
                privacy_status: "private".to_string(),
            },
        };

        let request = self
            .client
            .post(format!("{}/playlists", self.base_url))
            .query(&[("part", "snippet,status")])
            .json(&body);

        let created: YtPlaylist = self.send_json(request).await?;
        Ok(created.id)
    }

    /// Video ids currently in a playlist.
    pub async fn playlist_video_ids(&self, playlist_id: &str) -> Result<HashSet<String>, SyncError> {
        let page_size = PAGE_SIZE.to_string();
        let mut ids = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(format!("{}/playlistItems", self.base_url))
                .query(&[
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", page_size.as_str()),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: YtPlaylistItemListResponse = self.send_json(request).await?;
            ids.extend(page.items.into_iter().map(|i| i.content_details.video_id));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(ids),
            }
        }
    }

    pub async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> Result<(), SyncError> {
        let body = InsertYtPlaylistItemRequest {
            snippet: InsertYtPlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: YtVideoResource {
                    kind: "youtube#video".to_string(),
                    video_id: video_id.to_string(),
                },
            },
        };

        let request = self
            .client
            .post(format!("{}/playlistItems", self.base_url))
            .query(&[("part", "snippet")])
            .json(&body);

        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let response = request.bearer_auth(&self.token).send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SyncError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SyncError::Transient(format!("Malformed YouTube response: {}", e)))
    }
}

impl SearchTransport for YouTubeClient {
    async fn search_once(&self, query: &str, max_results: u32) -> Result<Vec<SearchCandidate>, SyncError> {
        let max_results = max_results.to_string();
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", max_results.as_str()),
            ]);

        let response: YtSearchResponse = self.send_json(request).await?;
        Ok(response.items.into_iter().filter_map(to_candidate).collect())
    }
}

/// Converts a search hit, dropping anything that is not a video.
fn to_candidate(item: YtSearchItem) -> Option<SearchCandidate> {
    let video_id = item.id.video_id?;
    let channel = utils::unescape_html(item.snippet.channel_title.trim());
    Some(SearchCandidate {
        destination_id: video_id,
        display_title: utils::unescape_html(item.snippet.title.trim()),
        display_artist: CHANNEL_SUFFIX.replace(&channel, "").trim().to_string(),
    })
}

async fn error_from_response(response: Response) -> SyncError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = response.text().await.unwrap_or_default();
    let reason = serde_json::from_str::<YtErrorResponse>(&body)
        .ok()
        .and_then(|e| e.error.errors.into_iter().next().map(|d| d.reason))
        .filter(|r| !r.is_empty());

    SyncError::from_status(status, reason.as_deref(), retry_after)
}
