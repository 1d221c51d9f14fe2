use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};

use crate::{error::SyncError, types::UnresolvedTrack};

/// Plain-text list of tracks that could not be migrated, for manual
/// follow-up. Each run appends to the same file.
pub struct FailureReport {
    path: PathBuf,
}

impl FailureReport {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format_line(playlist_name: &str, unresolved: &UnresolvedTrack) -> String {
        format!("[{}] {}", playlist_name, unresolved.track)
    }

    /// Appends one line per unresolved track and returns how many were written.
    pub async fn append(
        &self,
        playlist_name: &str,
        unresolved: &[UnresolvedTrack],
    ) -> Result<usize, SyncError> {
        if unresolved.is_empty() {
            return Ok(0);
        }

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let mut content = String::new();
        for u in unresolved {
            content.push_str(&Self::format_line(playlist_name, u));
            content.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(unresolved.len())
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spytcli/failed_tracks.txt");
        path
    }
}
