use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::{self, Settings},
    error, info,
    management::{CandidateCache, FailureReport, TokenManager},
    matching::MatchScorer,
    search::{QuotaAwareSearch, RetryPolicy},
    spotify::SpotifyClient,
    success,
    sync::Synchronizer,
    types::{Service, SyncReport, SyncSummaryRow},
    utils, warning,
    youtube::{YouTubeClient, YouTubePlaylists},
};

/// Command-line overrides of the matching settings.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub threshold: Option<f64>,
    pub max_retries: Option<u32>,
    pub max_results: Option<u32>,
    pub report: Option<PathBuf>,
}

/// Migrates every given Spotify playlist to YouTube, one after the other.
///
/// A playlist that cannot be read is skipped. Quota exhaustion carries over
/// to the following playlists, which are then only reported. Fatal errors
/// stop the program.
pub async fn convert(playlists: Vec<String>, options: ConvertOptions) {
    let settings = match Settings::from_env().and_then(|s| {
        s.with_overrides(options.threshold, options.max_retries, options.max_results)
    }) {
        Ok(settings) => settings,
        Err(e) => error!("Invalid settings: {}", e),
    };

    let spotify_token = access_token(Service::Spotify).await;
    let youtube_token = access_token(Service::YouTube).await;

    let client = match utils::http_client(settings.http_timeout) {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let spotify = SpotifyClient::new(client.clone(), &config::spotify_apiurl(), &spotify_token);
    let search = QuotaAwareSearch::new(
        YouTubeClient::new(client, &config::youtube_apiurl(), &youtube_token),
        RetryPolicy::new(settings.max_retries),
        settings.max_results,
    );
    let writer = YouTubePlaylists::new(search.transport(), search.policy());

    let mut cache = CandidateCache::load(CandidateCache::default_path()).await;
    info!(
        "Loaded {} cached lookups from {}",
        cache.len(),
        cache.path().display()
    );

    let failure_report = FailureReport::new(options.report.unwrap_or_else(FailureReport::default_path));

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warning!("Interrupted. Finishing the current track...");
            cancel_flag.store(true, Ordering::SeqCst);
        }
    });

    let mut synchronizer = Synchronizer::new(
        &mut cache,
        &search,
        &writer,
        MatchScorer::new(settings.match_threshold),
    )
    .with_cancel_flag(Arc::clone(&cancel));

    let mut summary: Vec<SyncSummaryRow> = Vec::new();
    let mut failed_lines = 0;

    for input in playlists {
        if cancel.load(Ordering::SeqCst) {
            break;
        }

        let Some(playlist_id) = utils::parse_playlist_id(&input) else {
            warning!("Not a Spotify playlist id or URL: {}", input);
            continue;
        };

        info!("Reading Spotify playlist {}...", playlist_id);
        let (name, tracks) = match spotify.get_playlist(&playlist_id).await {
            Ok(playlist) => playlist,
            Err(e) if e.is_fatal() => error!("Cannot read playlist {}: {}", playlist_id, e),
            Err(e) => {
                warning!("Skipping playlist {}: {}", playlist_id, e);
                continue;
            }
        };

        if tracks.is_empty() {
            info!("Playlist {} has no tracks", name);
            continue;
        }

        let pb = progress_bar(tracks.len() as u64, &name);
        let report = match synchronizer.sync_playlist(&name, &tracks, &pb).await {
            Ok(report) => report,
            Err(e) => {
                pb.finish_and_clear();
                error!("Conversion of {} aborted: {}", name, e);
            }
        };
        pb.finish_and_clear();

        match failure_report.append(&name, &report.unresolved).await {
            Ok(n) => failed_lines += n,
            Err(e) => warning!(
                "Cannot write {}: {}",
                failure_report.path().display(),
                e
            ),
        }

        print_outcome(&report);
        summary.push(summary_row(&report, tracks.len()));
    }

    let degraded = synchronizer.is_degraded();

    if summary.is_empty() {
        warning!("No playlist was converted.");
        return;
    }

    println!("{}", Table::new(summary));

    if failed_lines > 0 {
        info!(
            "{} unresolved tracks written to {}",
            failed_lines,
            failure_report.path().display()
        );
    }
    if degraded {
        warning!("YouTube quota exhausted. Run the same command again once it resets.");
    }
}

async fn access_token(service: Service) -> String {
    let mut token_mgr = match TokenManager::load(service).await {
        Ok(mgr) => mgr,
        Err(_) => error!(
            "No {} token found. Run spytcli auth {}",
            service,
            service.as_str()
        ),
    };

    match token_mgr.get_valid_token().await {
        Ok(token) => token,
        Err(e) => error!("{}", e),
    }
}

fn progress_bar(len: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .progress_chars("=> "),
    );
    pb.set_message(name.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_outcome(report: &SyncReport) {
    if report.playlist_id.is_empty() {
        warning!(
            "Playlist {} was not created on YouTube",
            report.playlist_name
        );
        return;
    }

    success!(
        "{}: added {} tracks ({} from cache, {} searches)",
        report.playlist_name,
        report.inserted.len(),
        report.cache_hits,
        report.searches
    );
    if !report.not_inserted.is_empty() {
        warning!(
            "{}: {} matched tracks could not be added",
            report.playlist_name,
            report.not_inserted.len()
        );
    }
}

fn summary_row(report: &SyncReport, tracks: usize) -> SyncSummaryRow {
    let status = if report.cancelled {
        "cancelled"
    } else if report.degraded {
        "quota exhausted"
    } else if !report.not_inserted.is_empty() {
        "partial"
    } else {
        "done"
    };

    SyncSummaryRow {
        playlist: report.playlist_name.clone(),
        tracks,
        added: report.inserted.len(),
        duplicates: report.duplicates,
        unresolved: report.unresolved.len(),
        status: status.to_string(),
    }
}
