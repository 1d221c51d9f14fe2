use tabled::Table;

use crate::{info, management::CandidateCache, types::CacheStatsRow};

/// Prints statistics of the candidate cache.
pub async fn cache() {
    let cache = CandidateCache::load(CandidateCache::default_path()).await;
    if cache.is_empty() {
        info!(
            "Candidate cache at {} is empty. Run spytcli convert first.",
            cache.path().display()
        );
        return;
    }

    let stats = cache.stats();
    let table = Table::new(vec![CacheStatsRow {
        entries: stats.entries,
        matches: stats.matches,
        tombstones: stats.tombstones,
        path: cache.path().display().to_string(),
    }]);
    println!("{}", table);
}
