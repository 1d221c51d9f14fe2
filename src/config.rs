//! Configuration management for spytcli.
//!
//! Values come from, in order of priority:
//! 1. Command-line flags (for the matching settings)
//! 2. Environment variables
//! 3. The `.env` file in the local data directory
//! 4. Application defaults (where applicable)
//!
//! Credentials have no default; a missing one is a fatal error for the
//! command that needs it.

use std::{env, io::ErrorKind, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::SyncError,
    matching::DEFAULT_THRESHOLD,
    oauth::OAuthProvider,
    types::Service,
};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Upper bound of `maxResults` accepted by the YouTube search endpoint.
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Loads environment variables from `.env` in the local data directory.
///
/// The file lives in:
/// - Linux: `~/.local/share/spytcli/.env`
/// - macOS: `~/Library/Application Support/spytcli/.env`
/// - Windows: `%LOCALAPPDATA%/spytcli/.env`
///
/// A missing file is not an error, since every value may also come from
/// the process environment. A file that exists but cannot be parsed is.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spytcli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn required(name: &str) -> Result<String, SyncError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SyncError::Fatal(format!("{} must be set", name))),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(name: &str, default: T) -> Result<T, SyncError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| SyncError::Fatal(format!("{} has an invalid value: {}", name, value))),
        _ => Ok(default),
    }
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Spotify Web API base URL.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// YouTube Data API v3 base URL.
pub fn youtube_apiurl() -> String {
    optional("YOUTUBE_API_URL", "https://www.googleapis.com/youtube/v3")
}

/// OAuth settings for `service`.
///
/// Spotify uses a public PKCE client. Google requires the client secret
/// even for installed applications and only returns a refresh token when
/// offline access is requested.
pub fn oauth_provider(service: Service) -> Result<OAuthProvider, SyncError> {
    match service {
        Service::Spotify => Ok(OAuthProvider {
            service,
            auth_url: optional(
                "SPOTIFY_API_AUTH_URL",
                "https://accounts.spotify.com/authorize",
            ),
            token_url: optional(
                "SPOTIFY_API_TOKEN_URL",
                "https://accounts.spotify.com/api/token",
            ),
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: None,
            redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
            scope: optional("SPOTIFY_API_AUTH_SCOPE", "playlist-read-private"),
            extra_params: Vec::new(),
        }),
        Service::YouTube => Ok(OAuthProvider {
            service,
            auth_url: optional(
                "YOUTUBE_AUTH_URL",
                "https://accounts.google.com/o/oauth2/v2/auth",
            ),
            token_url: optional("YOUTUBE_TOKEN_URL", "https://oauth2.googleapis.com/token"),
            client_id: required("YOUTUBE_CLIENT_ID")?,
            client_secret: Some(required("YOUTUBE_CLIENT_SECRET")?),
            redirect_uri: required("YOUTUBE_REDIRECT_URI")?,
            scope: "https://www.googleapis.com/auth/youtube.force-ssl".to_string(),
            extra_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
        }),
    }
}

/// Tunables of the matching engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub match_threshold: f64,
    pub max_retries: u32,
    pub max_results: u32,
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            max_results: DEFAULT_MAX_RESULTS,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads `MATCH_THRESHOLD`, `SEARCH_MAX_RETRIES`, `SEARCH_MAX_RESULTS`
    /// and `HTTP_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self, SyncError> {
        Self {
            match_threshold: parsed("MATCH_THRESHOLD", DEFAULT_THRESHOLD)?,
            max_retries: parsed("SEARCH_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            max_results: parsed("SEARCH_MAX_RESULTS", DEFAULT_MAX_RESULTS)?,
            http_timeout: Duration::from_secs(parsed(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        }
        .validate()
    }

    pub fn with_overrides(
        mut self,
        threshold: Option<f64>,
        max_retries: Option<u32>,
        max_results: Option<u32>,
    ) -> Result<Self, SyncError> {
        if let Some(t) = threshold {
            self.match_threshold = t;
        }
        if let Some(r) = max_retries {
            self.max_retries = r;
        }
        if let Some(r) = max_results {
            self.max_results = r;
        }
        self.validate()
    }

    pub fn validate(self) -> Result<Self, SyncError> {
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(SyncError::Fatal(format!(
                "Match threshold must be between 0 and 1, got {}",
                self.match_threshold
            )));
        }
        if self.max_retries == 0 {
            return Err(SyncError::Fatal(
                "Search retries must allow at least one attempt".to_string(),
            ));
        }
        if self.max_results == 0 || self.max_results > MAX_RESULTS_LIMIT {
            return Err(SyncError::Fatal(format!(
                "Search result cap must be between 1 and {}, got {}",
                MAX_RESULTS_LIMIT, self.max_results
            )));
        }
        if self.http_timeout.is_zero() {
            return Err(SyncError::Fatal("HTTP timeout must be positive".to_string()));
        }
        Ok(self)
    }
}
