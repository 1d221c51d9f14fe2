use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

use crate::types::{MatchResult, SearchCandidate, SearchQuery};

pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Added to candidates whose artist equals the query artist.
pub const ARTIST_BIAS: f64 = 0.05;

const TOKEN_SET_WEIGHT: f64 = 0.6;
const TOKEN_SORT_WEIGHT: f64 = 1.0 - TOKEN_SET_WEIGHT;

/// Picks the best destination candidate for a query.
#[derive(Debug, Clone, Copy)]
pub struct MatchScorer {
    threshold: f64,
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl MatchScorer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scores every candidate and returns the best one.
    ///
    /// Candidates are compared as `"<artist> - <title>"`. On equal scores the
    /// earlier candidate wins, since the destination already ranked them.
    /// A best score below the threshold yields a non-confident result
    /// without a destination id.
    pub fn score(
        &self,
        source_id: &str,
        query: &SearchQuery,
        candidates: &[SearchCandidate],
    ) -> MatchResult {
        let mut best: Option<(&SearchCandidate, f64)> = None;

        for candidate in candidates {
            let score = self.adjusted_score(query, candidate);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((candidate, score)),
            }
        }

        match best {
            Some((candidate, score)) if score >= self.threshold => MatchResult {
                source_id: source_id.to_string(),
                destination_id: Some(candidate.destination_id.clone()),
                score,
                confident: true,
            },
            Some((_, score)) => MatchResult::no_match(source_id, score),
            None => MatchResult::no_match(source_id, 0.0),
        }
    }

    /// Similarity plus the artist bias, clamped to [0, 1].
    pub fn adjusted_score(&self, query: &SearchQuery, candidate: &SearchCandidate) -> f64 {
        let mut score = similarity(&query.text, &candidate.composed());
        if same_artist(&query.artist, &candidate.display_artist) {
            score += ARTIST_BIAS;
        }
        score.clamp(0.0, 1.0)
    }
}

fn same_artist(a: &str, b: &str) -> bool {
    let a = a.trim();
    !a.is_empty() && a.to_lowercase() == b.trim().to_lowercase()
}

fn tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Fuzzy similarity of two strings in [0, 1].
///
/// Blends a token-set ratio, which ignores extra words on either side, with
/// a token-sort ratio, which does not. The blend keeps "Title (Radio Edit)"
/// close to "Title" while still ranking the plain title higher.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    TOKEN_SET_WEIGHT * token_set_ratio(&a, &b) + TOKEN_SORT_WEIGHT * token_sort_ratio(&a, &b)
}

fn token_sort_ratio(a: &[String], b: &[String]) -> f64 {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort();
    b.sort();
    normalized_levenshtein(&a.join(" "), &b.join(" "))
}

fn token_set_ratio(a: &[String], b: &[String]) -> f64 {
    let a: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let b: BTreeSet<&str> = b.iter().map(String::as_str).collect();

    let common: Vec<&str> = a.intersection(&b).copied().collect();
    let only_a: Vec<&str> = a.difference(&b).copied().collect();
    let only_b: Vec<&str> = b.difference(&a).copied().collect();

    let base = common.join(" ");
    let with_a = [common.as_slice(), only_a.as_slice()].concat().join(" ");
    let with_b = [common.as_slice(), only_b.as_slice()].concat().join(" ");

    let mut best = normalized_levenshtein(&with_a, &with_b);
    if !base.is_empty() {
        best = best
            .max(normalized_levenshtein(&base, &with_a))
            .max(normalized_levenshtein(&base, &with_b));
    }
    best
}
