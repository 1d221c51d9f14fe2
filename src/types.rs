use std::{collections::HashSet, fmt};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::oauth::OAuthProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Service {
    Spotify,
    #[value(name = "youtube")]
    YouTube,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Spotify => "spotify",
            Service::YouTube => "youtube",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Spotify => "Spotify",
            Service::YouTube => "YouTube",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// State shared between an authorization flow and the callback handler.
#[derive(Debug, Clone)]
pub struct PkceToken {
    pub provider: OAuthProvider,
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// A track read from the source playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTrack {
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub source_id: String,
}

impl SourceTrack {
    pub fn new(artist: &str, title: &str, source_id: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            album: None,
            source_id: source_id.to_string(),
        }
    }
}

impl fmt::Display for SourceTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.artist.trim().is_empty(), self.title.trim().is_empty()) {
            (false, false) => write!(f, "{} - {}", self.artist.trim(), self.title.trim()),
            (true, false) => write!(f, "{}", self.title.trim()),
            (false, true) => write!(f, "{}", self.artist.trim()),
            (true, true) => write!(f, "<unknown track {}>", self.source_id),
        }
    }
}

/// Normalized `artist|title` key of the candidate cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(pub String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One persisted resolution. `destination_id == None` is a tombstone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub destination_id: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_tombstone(&self) -> bool {
        self.destination_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub destination_id: String,
    pub display_title: String,
    pub display_artist: String,
}

impl SearchCandidate {
    pub fn new(destination_id: &str, display_artist: &str, display_title: &str) -> Self {
        Self {
            destination_id: destination_id.to_string(),
            display_title: display_title.to_string(),
            display_artist: display_artist.to_string(),
        }
    }

    pub fn composed(&self) -> String {
        format!("{} - {}", self.display_artist, self.display_title)
    }
}

/// A query string for the destination search, together with the artist
/// token the scorer compares candidates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub artist: String,
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub source_id: String,
    pub destination_id: Option<String>,
    pub score: f64,
    pub confident: bool,
}

impl MatchResult {
    pub fn no_match(source_id: &str, score: f64) -> Self {
        Self {
            source_id: source_id.to_string(),
            destination_id: None,
            score,
            confident: false,
        }
    }
}

/// Matches of a single source playlist in source order, plus the ids that
/// already exist in the target playlist.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPlan {
    pub matches: Vec<MatchResult>,
    pub existing: HashSet<String>,
}

impl PlaylistPlan {
    pub fn new(existing: HashSet<String>) -> Self {
        Self {
            matches: Vec::new(),
            existing,
        }
    }

    /// Returns `true` when `destination_id` is neither in the target
    /// playlist nor already planned.
    pub fn is_new(&self, destination_id: &str) -> bool {
        !self.existing.contains(destination_id)
            && !self
                .matches
                .iter()
                .any(|m| m.confident && m.destination_id.as_deref() == Some(destination_id))
    }

    /// Ids to insert, in source order, without anything already present in
    /// the target playlist and without repeats.
    pub fn insertions(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = self.existing.iter().map(String::as_str).collect();
        self.matches
            .iter()
            .filter(|m| m.confident)
            .filter_map(|m| m.destination_id.as_deref())
            .filter(|id| seen.insert(id))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    NoMatch,
    CachedNoMatch,
    EmptyMetadata,
    QuotaExhausted,
    SearchFailed,
    Cancelled,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnresolvedReason::NoMatch => "no confident match",
            UnresolvedReason::CachedNoMatch => "no match (cached)",
            UnresolvedReason::EmptyMetadata => "missing artist and title",
            UnresolvedReason::QuotaExhausted => "search quota exhausted",
            UnresolvedReason::SearchFailed => "search failed",
            UnresolvedReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct UnresolvedTrack {
    pub track: SourceTrack,
    pub reason: UnresolvedReason,
}

/// Outcome of synchronizing one source playlist.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub playlist_name: String,
    pub playlist_id: String,
    pub plan: PlaylistPlan,
    pub inserted: Vec<String>,
    pub not_inserted: Vec<String>,
    pub unresolved: Vec<UnresolvedTrack>,
    pub cache_hits: usize,
    pub searches: usize,
    pub duplicates: usize,
    pub degraded: bool,
    pub cancelled: bool,
}

#[derive(Tabled)]
pub struct CacheStatsRow {
    pub entries: usize,
    pub matches: usize,
    pub tombstones: usize,
    pub path: String,
}

#[derive(Tabled)]
pub struct SyncSummaryRow {
    pub playlist: String,
    pub tracks: usize,
    pub added: usize,
    pub duplicates: usize,
    pub unresolved: usize,
    pub status: String,
}

// Spotify wire schemas

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyPlaylist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksPage {
    pub items: Vec<PlaylistTrackItem>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<SpotifyTrack>,
    #[serde(default)]
    pub is_local: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    pub name: String,
}

// YouTube Data API v3 wire schemas

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtSearchResponse {
    #[serde(default)]
    pub items: Vec<YtSearchItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtSearchItem {
    pub id: YtResourceId,
    pub snippet: YtSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtSnippet {
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtPlaylistListResponse {
    #[serde(default)]
    pub items: Vec<YtPlaylist>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtPlaylist {
    pub id: String,
    pub snippet: YtPlaylistSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtPlaylistSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtPlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<YtPlaylistItem>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtPlaylistItem {
    pub content_details: YtPlaylistItemDetails,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YtPlaylistItemDetails {
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateYtPlaylistRequest {
    pub snippet: YtPlaylistSnippet,
    pub status: YtPrivacyStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YtPrivacyStatus {
    pub privacy_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertYtPlaylistItemRequest {
    pub snippet: InsertYtPlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertYtPlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: YtVideoResource,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YtVideoResource {
    pub kind: String,
    pub video_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtErrorResponse {
    pub error: YtErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<YtErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YtErrorDetail {
    #[serde(default)]
    pub reason: String,
}
