use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{CacheKey, SearchQuery, SourceTrack};

/// Bracketed qualifiers holding a noise token: "(Remastered 2011)",
/// "[Live at Wembley]", "(feat. Someone)", "(Radio Edit)".
static BRACKETED_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s*[\(\[][^\)\]]*\b(?:remaster(?:ed)?|live|feat|ft|featuring|with|remix|edit|version|mono|stereo|deluxe|acoustic|explicit|radio|mix)\b[^\)\]]*[\)\]]",
    )
    .expect("valid bracketed noise pattern")
});

/// Dash suffixes of the same kind: "- Remastered 2011", "- Live", "- Radio Edit".
static DASH_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+[-–—]\s+[^-–—]*\b(?:remaster(?:ed)?|live|remix|edit|version|mono|stereo|acoustic|mix)\b.*$",
    )
    .expect("valid dash noise pattern")
});

/// Featured artists without brackets: "Song feat. Artist", "Artist ft. Someone".
static FEAT_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:feat\.?|ft\.|featuring)\s+.+$").expect("valid feat pattern")
});

/// Collapses runs of whitespace into single spaces and trims.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace and drops tokens made only of punctuation.
fn tidy(s: &str) -> String {
    s.split_whitespace()
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes bracketed and dashed qualifiers as well as `feat.` tails.
pub fn strip_noise(s: &str) -> String {
    let stripped = BRACKETED_NOISE.replace_all(s, "");
    let stripped = DASH_NOISE.replace(&stripped, "");
    let stripped = FEAT_TAIL.replace(&stripped, "");
    collapse_whitespace(&stripped)
}

fn compose(artist: &str, title: &str) -> String {
    let raw = format!("{} {}", artist, title);
    let tidied = tidy(&raw);
    if tidied.is_empty() {
        // Names made of punctuation only ("!!!") are still worth a search.
        collapse_whitespace(&raw)
    } else {
        tidied
    }
}

/// Builds the search queries for a track, most specific first.
///
/// The first query keeps the title as-is (minus whitespace and punctuation
/// noise). The second, when different, has remaster/live/feat/... qualifiers
/// removed. Casing is preserved. Returns an empty vector only when both the
/// artist and the title are blank.
pub fn normalize(track: &SourceTrack) -> Vec<SearchQuery> {
    let artist = collapse_whitespace(&track.artist);
    let title = collapse_whitespace(&track.title);

    if artist.is_empty() && title.is_empty() {
        return Vec::new();
    }

    let mut queries = vec![SearchQuery {
        text: compose(&artist, &title),
        artist: artist.clone(),
    }];

    let main_artist = collapse_whitespace(&FEAT_TAIL.replace(&artist, ""));
    let fallback = compose(&main_artist, &strip_noise(&title));
    if !fallback.is_empty() && fallback != queries[0].text {
        queries.push(SearchQuery {
            text: fallback,
            artist: main_artist,
        });
    }

    queries
}

/// Case and whitespace insensitive cache key for a track.
///
/// Encoded as a JSON array of artist and title, so no separator character
/// can make two different tracks share a key.
pub fn cache_key(track: &SourceTrack) -> CacheKey {
    let artist = collapse_whitespace(&track.artist).to_lowercase();
    let title = collapse_whitespace(&track.title).to_lowercase();
    CacheKey(serde_json::json!([artist, title]).to_string())
}
