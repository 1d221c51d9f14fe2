//! # Matching Module
//!
//! Turns source track metadata into destination search queries and picks the
//! best search result for them.
//!
//! - [`normalize`] builds prioritized queries and the cache key of a track
//! - [`MatchScorer`] scores search candidates against a query
//!
//! Matching is purely string based; nothing here talks to the network.

mod normalize;
mod scorer;

pub use normalize::cache_key;
pub use normalize::collapse_whitespace;
pub use normalize::normalize;
pub use normalize::strip_noise;
pub use scorer::ARTIST_BIAS;
pub use scorer::DEFAULT_THRESHOLD;
pub use scorer::MatchScorer;
pub use scorer::similarity;
