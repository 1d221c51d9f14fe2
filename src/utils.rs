use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Client;
use sha2::{Digest, Sha256};

use crate::error::SyncError;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// HTTP client shared by the service clients of a run.
pub fn http_client(timeout: Duration) -> Result<Client, SyncError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .map_err(|e| SyncError::Fatal(format!("Cannot build HTTP client: {}", e)))
}

/// Extracts a Spotify playlist id from a raw id, a `spotify:playlist:` URI
/// or an `open.spotify.com/playlist/...` URL.
pub fn parse_playlist_id(input: &str) -> Option<String> {
    let input = input.trim();
    let id = if let Some(rest) = input.strip_prefix("spotify:playlist:") {
        rest
    } else if let Some(pos) = input.find("/playlist/") {
        let rest = &input[pos + "/playlist/".len()..];
        rest.split(['?', '#', '/']).next().unwrap_or_default()
    } else {
        input
    };

    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// Decodes the HTML entities YouTube leaves in snippet titles.
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
