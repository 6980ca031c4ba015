use std::{path::PathBuf, sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::{
    config, error, info,
    management::{LinkCache, LinkStore},
    orchestrator::{Orchestrator, Report},
    resolver::LinkResolver,
    spotify::{SpotifyClient, TrackSource},
    types::Track,
    utils, warning, youtube,
};

/// What a run works on.
#[derive(Debug, Clone)]
pub enum Target {
    Tracks(Vec<String>),
    Playlist(String),
}

/// Options shared by every command that touches the link cache.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    pub database: Option<PathBuf>,
    pub no_cache: bool,
}

/// Opens the link cache. Failing to open it ends the program before any
/// work starts.
pub async fn open_cache(options: &CacheOptions, connections: u32) -> LinkCache {
    if options.no_cache {
        return match LinkCache::in_memory().await {
            Ok(cache) => cache,
            Err(e) => error!("Cannot open in-memory link cache: {}", e),
        };
    }

    let path = options.database.clone().unwrap_or_else(config::database_path);
    match LinkCache::open(&path, connections).await {
        Ok(cache) => cache,
        Err(e) => error!("Cannot open link cache. Err: {}", e),
    }
}

/// HTTP client with [`utils::REQUEST_TIMEOUT`] applied to every request.
pub fn http_client() -> Client {
    match utils::http_client(utils::REQUEST_TIMEOUT) {
        Ok(client) => client,
        Err(e) => error!("Cannot build HTTP client. Err: {}", e),
    }
}

pub fn worker_count(workers: Option<usize>) -> usize {
    match workers {
        Some(n) => n.max(1),
        None => match config::workers() {
            Ok(n) => n,
            Err(e) => {
                warning!("{}; using {} workers", e, config::default_workers());
                config::default_workers()
            }
        },
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

fn bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.blue} Resolving links [{bar:30.blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

/// Fetches the tracks of `target`. Spotify being unreachable ends the run.
pub async fn fetch_tracks(http: &Client, target: &Target) -> Vec<Track> {
    let source = match SpotifyClient::from_env(http.clone()).await {
        Ok(source) => source,
        Err(e) => error!("Cannot set up Spotify client. Err: {}", e),
    };

    fetch_from(&source, target).await
}

pub async fn fetch_from(source: &dyn TrackSource, target: &Target) -> Vec<Track> {
    match target {
        Target::Tracks(ids) => {
            let pb = spinner("Fetching tracks...");
            let mut tracks = Vec::with_capacity(ids.len());
            for id in ids {
                match source.fetch_single(id).await {
                    Ok(Some(track)) => tracks.push(track),
                    Ok(None) => {
                        pb.suspend(|| warning!("Track {} not found on Spotify", id));
                    }
                    Err(e) => {
                        pb.finish_and_clear();
                        error!("Cannot fetch track {}. Err: {}", id, e);
                    }
                }
            }
            pb.finish_and_clear();
            tracks
        }
        Target::Playlist(id) => {
            let pb = spinner("Fetching playlist tracks...");
            let result = source.fetch_playlist(id).await;
            pb.finish_and_clear();
            match result {
                Ok(tracks) => {
                    info!("Playlist {} has {} tracks", id, tracks.len());
                    tracks
                }
                Err(e) => error!("Cannot fetch playlist {}. Err: {}", id, e),
            }
        }
    }
}

/// Resolves `tracks` through the cache and the configured discovery
/// backend. Ctrl-C stops dispatching new tracks.
pub async fn resolve(
    http: &Client,
    store: Arc<dyn LinkStore>,
    tracks: Vec<Track>,
    workers: usize,
) -> Report {
    let discovery = match youtube::from_env(http.clone()) {
        Ok(discovery) => discovery,
        Err(e) => error!("Cannot set up link discovery. Err: {}", e),
    };
    let resolver = LinkResolver::new(Arc::from(discovery), config::youtube_host());

    let pb = bar(tracks.len());
    let orchestrator = Orchestrator::new(store, resolver, workers).with_progress(pb.clone());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        interrupt.cancel();
        warning!("Stopping after the tracks in flight; press Ctrl-C again to quit now");
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("Interrupted");
        }
    });

    let report = orchestrator.run(tracks, &cancel).await;
    listener.abort();
    pb.finish_and_clear();
    report
}

/// Prints the per-run counters.
pub fn summarize(report: &Report) {
    info!(
        "{} links: {} from cache, {} resolved",
        report.links.len(),
        report.hits,
        report.resolved
    );
    if report.not_found > 0 {
        warning!("No link found for {} tracks", report.not_found);
    }
    if report.failed > 0 {
        warning!("Resolution failed for {} tracks", report.failed);
    }
    if report.write_failures > 0 {
        warning!(
            "{} links could not be stored in the cache and will be resolved again next run",
            report.write_failures
        );
    }
    if report.skipped > 0 {
        warning!("Interrupted: {} tracks were not processed", report.skipped);
    }
}
