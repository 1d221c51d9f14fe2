use spytcli::management::{CacheStats, CandidateCache};
use spytcli::types::CacheKey;
use tempfile::tempdir;

fn key(s: &str) -> CacheKey {
    CacheKey(s.to_string())
}

fn line_count(path: &std::path::Path) -> usize {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.trim().is_empty())
        .count()
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let cache = CandidateCache::load(dir.path().join("candidates.jsonl")).await;

    assert!(cache.is_empty());
    assert_eq!(cache.stats(), CacheStats::default());
}

#[tokio::test]
async fn test_store_and_reload() {
    let dir = tempdir().unwrap();
    // Parent directory is created on first write
    let path = dir.path().join("nested/candidates.jsonl");

    let mut cache = CandidateCache::load(path.clone()).await;
    assert!(cache.store(key("daft punk|get lucky"), Some("yt1".into())).await.unwrap());
    assert!(cache.store(key("nobody|nothing"), None).await.unwrap());

    let reloaded = CandidateCache::load(path).await;
    assert_eq!(reloaded.len(), 2);

    let hit = reloaded.lookup(&key("daft punk|get lucky")).unwrap();
    assert_eq!(hit.destination_id.as_deref(), Some("yt1"));

    let tombstone = reloaded.lookup(&key("nobody|nothing")).unwrap();
    assert!(tombstone.is_tombstone());

    assert_eq!(
        reloaded.stats(),
        CacheStats {
            entries: 2,
            matches: 1,
            tombstones: 1
        }
    );
}

#[tokio::test]
async fn test_store_same_value_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("candidates.jsonl");

    let mut cache = CandidateCache::load(path.clone()).await;
    assert!(cache.store(key("a|b"), Some("yt1".into())).await.unwrap());
    assert!(!cache.store(key("a|b"), Some("yt1".into())).await.unwrap());

    assert_eq!(line_count(&path), 1);
}

#[tokio::test]
async fn test_last_record_wins() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("candidates.jsonl");

    let mut cache = CandidateCache::load(path.clone()).await;
    cache.store(key("a|b"), None).await.unwrap();
    cache.store(key("a|b"), Some("yt2".into())).await.unwrap();
    assert_eq!(line_count(&path), 2);

    let reloaded = CandidateCache::load(path).await;
    assert_eq!(reloaded.len(), 1);
    assert_eq!(
        reloaded.lookup(&key("a|b")).unwrap().destination_id.as_deref(),
        Some("yt2")
    );
}

#[tokio::test]
async fn test_truncated_trailing_record_is_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("candidates.jsonl");

    {
        let mut cache = CandidateCache::load(path.clone()).await;
        cache.store(key("a|b"), Some("yt1".into())).await.unwrap();
    }

    // Simulate a write interrupted halfway through a record
    let mut content = std::fs::read_to_string(&path).unwrap();
    content.push_str(r#"{"key":"c|d","destination_id":"yt"#);
    std::fs::write(&path, content).unwrap();

    let mut cache = CandidateCache::load(path.clone()).await;
    assert_eq!(cache.len(), 1);
    assert!(cache.lookup(&key("c|d")).is_none());

    // Appending after a truncated line must not merge into it
    cache.store(key("e|f"), Some("yt3".into())).await.unwrap();
    let reloaded = CandidateCache::load(path).await;
    assert_eq!(reloaded.len(), 2);
    assert_eq!(
        reloaded.lookup(&key("e|f")).unwrap().destination_id.as_deref(),
        Some("yt3")
    );
}

#[tokio::test]
async fn test_garbage_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("candidates.jsonl");
    std::fs::write(
        &path,
        "not json\n\n{\"key\":\"a|b\",\"destination_id\":\"yt1\",\"resolved_at\":\"2024-01-01T00:00:00Z\"}\n",
    )
    .unwrap();

    let cache = CandidateCache::load(path).await;
    assert_eq!(cache.len(), 1);
    assert_eq!(
        cache.lookup(&key("a|b")).unwrap().destination_id.as_deref(),
        Some("yt1")
    );
}

#[tokio::test]
async fn test_unreadable_path_yields_empty_cache() {
    let dir = tempdir().unwrap();
    // A directory cannot be read as a file
    let cache = CandidateCache::load(dir.path().to_path_buf()).await;

    assert!(cache.is_empty());
}
