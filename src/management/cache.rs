use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{
    error::SyncError,
    types::{CacheEntry, CacheKey},
    warning,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub matches: usize,
    pub tombstones: usize,
}

/// Persistent map from normalized (artist, title) keys to destination ids.
///
/// Entries are stored as JSON Lines and only ever appended. When a key
/// appears more than once the last record wins. Malformed records, such as
/// a trailing line cut short by an interrupted write, are skipped on load.
pub struct CandidateCache {
    path: PathBuf,
    entries: HashMap<CacheKey, CacheEntry>,
    needs_newline: bool,
}

impl CandidateCache {
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            entries: HashMap::new(),
            needs_newline: false,
        }
    }

    /// Loads the cache from `path`.
    ///
    /// Never fails: a missing file yields an empty cache, an unreadable one
    /// an empty cache plus a warning.
    pub async fn load(path: PathBuf) -> Self {
        let content = match async_fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Self::empty(path),
            Err(e) => {
                warning!(
                    "Cannot read candidate cache {}: {}. Starting with an empty cache.",
                    path.display(),
                    e
                );
                return Self::empty(path);
            }
        };

        let mut entries = HashMap::new();
        let mut skipped = 0;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<CacheEntry>(line) {
                Ok(entry) => {
                    entries.insert(entry.key.clone(), entry);
                }
                Err(_) => skipped += 1,
            }
        }

        if skipped > 0 {
            warning!(
                "Skipped {} malformed record(s) in candidate cache {}",
                skipped,
                path.display()
            );
        }

        Self {
            path,
            entries,
            needs_newline: !content.is_empty() && !content.ends_with('\n'),
        }
    }

    pub fn lookup(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Records the resolution of `key`; `None` stores a tombstone.
    ///
    /// Returns `Ok(false)` without touching the disk when the key already
    /// holds the same value. The in-memory map is updated even if the append
    /// fails, so the current run stays consistent.
    pub async fn store(
        &mut self,
        key: CacheKey,
        destination_id: Option<String>,
    ) -> Result<bool, SyncError> {
        if let Some(existing) = self.entries.get(&key) {
            if existing.destination_id == destination_id {
                return Ok(false);
            }
        }

        let entry = CacheEntry {
            key: key.clone(),
            destination_id,
            resolved_at: Utc::now(),
        };
        let line = serde_json::to_string(&entry)?;
        self.entries.insert(key, entry);
        self.append(&line).await?;
        Ok(true)
    }

    async fn append(&mut self, line: &str) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let mut record = String::with_capacity(line.len() + 2);
        if self.needs_newline {
            record.push('\n');
        }
        record.push_str(line);
        record.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.flush().await?;

        self.needs_newline = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> CacheStats {
        let tombstones = self.entries.values().filter(|e| e.is_tombstone()).count();
        CacheStats {
            entries: self.entries.len(),
            matches: self.entries.len() - tombstones,
            tombstones,
        }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spytcli/cache/candidates.jsonl");
        path
    }
}
