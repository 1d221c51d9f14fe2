use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use indicatif::ProgressBar;

use crate::{
    error::{InsertFailure, SyncError},
    management::CandidateCache,
    matching::{self, MatchScorer},
    sync::{PlaylistWriter, TrackSearch},
    types::{
        CacheKey, MatchResult, PlaylistPlan, SourceTrack, SyncReport, UnresolvedReason,
        UnresolvedTrack,
    },
    warning,
};

/// Number of ids handed to the writer per insert call.
pub const INSERT_BATCH: usize = 25;

pub struct Synchronizer<'a, S, W> {
    cache: &'a mut CandidateCache,
    search: &'a S,
    writer: &'a W,
    scorer: MatchScorer,
    cancel: Arc<AtomicBool>,
    degraded: bool,
}

impl<'a, S: TrackSearch, W: PlaylistWriter> Synchronizer<'a, S, W> {
    pub fn new(
        cache: &'a mut CandidateCache,
        search: &'a S,
        writer: &'a W,
        scorer: MatchScorer,
    ) -> Self {
        Self {
            cache,
            search,
            writer,
            scorer,
            cancel: Arc::new(AtomicBool::new(false)),
            degraded: false,
        }
    }

    /// Flag polled between tracks; setting it stops the run after the
    /// current track.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// `true` once the destination quota ran out during this run.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Migrates `tracks` into the destination playlist called `name`.
    ///
    /// Returns `Err` only for fatal errors. Everything else ends up in the
    /// report. When the destination playlist cannot be prepared, tracks are
    /// still resolved and cached, and their ids are reported as not
    /// inserted.
    pub async fn sync_playlist(
        &mut self,
        name: &str,
        tracks: &[SourceTrack],
        progress: &ProgressBar,
    ) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport {
            playlist_name: name.to_string(),
            ..SyncReport::default()
        };

        if !self.degraded && !self.is_cancelled() {
            match self.prepare_playlist(name).await {
                Ok((playlist_id, plan)) => {
                    report.playlist_id = playlist_id;
                    report.plan = plan;
                }
                Err(SyncError::QuotaExceeded { attempts }) => {
                    warning!(
                        "Quota exhausted while preparing playlist {} ({} attempts)",
                        name,
                        attempts
                    );
                    self.degraded = true;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warning!("Cannot prepare playlist {}: {}", name, e),
            }
        }

        for track in tracks {
            if !report.cancelled && self.is_cancelled() {
                warning!("Cancelled. Remaining tracks of {} are skipped.", name);
                report.cancelled = true;
            }

            let (result, unresolved) = if report.cancelled {
                (
                    MatchResult::no_match(&track.source_id, 0.0),
                    Some(UnresolvedReason::Cancelled),
                )
            } else if self.degraded {
                (
                    MatchResult::no_match(&track.source_id, 0.0),
                    Some(UnresolvedReason::QuotaExhausted),
                )
            } else {
                self.resolve(track, &mut report).await?
            };

            if let Some(reason) = unresolved {
                report.unresolved.push(UnresolvedTrack {
                    track: track.clone(),
                    reason,
                });
            } else if let Some(id) = result.destination_id.as_deref() {
                if !report.plan.is_new(id) {
                    report.duplicates += 1;
                }
            }

            report.plan.matches.push(result);
            progress.inc(1);
        }

        self.commit(&mut report).await?;
        report.degraded = self.degraded;
        Ok(report)
    }

    async fn prepare_playlist(&self, name: &str) -> Result<(String, PlaylistPlan), SyncError> {
        let playlist_id = self.writer.create_or_get_playlist(name).await?;
        let existing = self.writer.list_existing_track_ids(&playlist_id).await?;
        Ok((playlist_id, PlaylistPlan::new(existing)))
    }

    /// Resolves a single pending track.
    ///
    /// Returns the match result and, when the track stays unresolved, why.
    async fn resolve(
        &mut self,
        track: &SourceTrack,
        report: &mut SyncReport,
    ) -> Result<(MatchResult, Option<UnresolvedReason>), SyncError> {
        let queries = matching::normalize(track);
        if queries.is_empty() {
            return Ok((
                MatchResult::no_match(&track.source_id, 0.0),
                Some(UnresolvedReason::EmptyMetadata),
            ));
        }

        let key = matching::cache_key(track);
        if let Some(entry) = self.cache.lookup(&key) {
            report.cache_hits += 1;
            return Ok(match &entry.destination_id {
                Some(id) => (
                    MatchResult {
                        source_id: track.source_id.clone(),
                        destination_id: Some(id.clone()),
                        score: 1.0,
                        confident: true,
                    },
                    None,
                ),
                None => (
                    MatchResult::no_match(&track.source_id, 0.0),
                    Some(UnresolvedReason::CachedNoMatch),
                ),
            });
        }

        let mut best = MatchResult::no_match(&track.source_id, 0.0);
        for query in &queries {
            report.searches += 1;
            match self.search.search(&query.text).await {
                Ok(candidates) => {
                    let result = self.scorer.score(&track.source_id, query, &candidates);
                    if result.confident {
                        best = result;
                        break;
                    }
                    if result.score > best.score {
                        best = result;
                    }
                }
                Err(SyncError::QuotaExceeded { attempts }) => {
                    warning!(
                        "Search quota exhausted after {} attempts. Remaining tracks are left unresolved.",
                        attempts
                    );
                    self.degraded = true;
                    return Ok((best, Some(UnresolvedReason::QuotaExhausted)));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warning!("Search for {} failed: {}", track, e);
                    return Ok((best, Some(UnresolvedReason::SearchFailed)));
                }
            }
        }

        self.remember(key, best.destination_id.clone()).await;
        if best.confident {
            Ok((best, None))
        } else {
            Ok((best, Some(UnresolvedReason::NoMatch)))
        }
    }

    async fn remember(&mut self, key: CacheKey, destination_id: Option<String>) {
        if let Err(e) = self.cache.store(key.clone(), destination_id).await {
            warning!("Cannot persist cache entry for {}: {}", key, e);
        }
    }

    /// Inserts the planned ids in batches.
    ///
    /// A rejected video is left out and insertion goes on with the next id.
    /// Any other recoverable failure stops the insertion and leaves the
    /// remaining ids in `not_inserted`.
    async fn commit(&mut self, report: &mut SyncReport) -> Result<(), SyncError> {
        let insertions = report.plan.insertions();
        if report.playlist_id.is_empty() {
            report.not_inserted = insertions;
            return Ok(());
        }

        let mut pending = insertions.as_slice();
        while !pending.is_empty() {
            let batch = &pending[..pending.len().min(INSERT_BATCH)];
            let InsertFailure { inserted, error } =
                match self.writer.insert_tracks(&report.playlist_id, batch).await {
                    Ok(()) => {
                        report.inserted.extend_from_slice(batch);
                        pending = &pending[batch.len()..];
                        continue;
                    }
                    Err(failure) => failure,
                };

            let inserted = inserted.min(batch.len() - 1);
            report.inserted.extend_from_slice(&batch[..inserted]);
            let failed = &pending[inserted..];

            match error {
                e if e.is_fatal() => return Err(e),
                SyncError::Rejected(reason) => {
                    warning!(
                        "YouTube rejected video {} for playlist {}: {}",
                        failed[0],
                        report.playlist_name,
                        reason
                    );
                    report.not_inserted.push(failed[0].clone());
                    pending = &failed[1..];
                }
                e => {
                    warning!(
                        "Failed to add tracks to playlist {}: {}",
                        report.playlist_name,
                        e
                    );
                    if matches!(e, SyncError::QuotaExceeded { .. }) {
                        self.degraded = true;
                    }
                    report.not_inserted.extend_from_slice(failed);
                    break;
                }
            }
        }

        Ok(())
    }
}
