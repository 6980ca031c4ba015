use std::{path::PathBuf, sync::Arc};

use crate::{
    cli::pipeline::{self, CacheOptions, Target},
    config,
    downloader::{self, Downloader, LinkMode},
    error, info, success, utils, warning,
};

#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub downloader: Option<String>,
    pub link_file: bool,
    pub dry_run: bool,
    pub save_links: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Fetches the target tracks, resolves them to links and downloads them.
///
/// Tracks that cannot be resolved are reported and skipped; the rest are
/// still downloaded. When nothing resolves, the downloader is not started.
pub async fn download(target: Target, cache: CacheOptions, options: DownloadOptions) {
    let http = pipeline::http_client();
    let workers = pipeline::worker_count(options.workers);
    let store = pipeline::open_cache(&cache, workers as u32).await;

    let tracks = pipeline::fetch_tracks(&http, &target).await;
    if tracks.is_empty() {
        warning!("Nothing to download: no tracks found");
        return;
    }

    let report = pipeline::resolve(&http, Arc::new(store.clone()), tracks, workers).await;
    store.close().await;
    pipeline::summarize(&report);

    if report.links.is_empty() {
        warning!("No track could be resolved to a link; skipping download");
        return;
    }

    let links = utils::sorted_links(&report.links);

    if let Some(path) = options.save_links {
        match downloader::save_link_file(&path, &links).await {
            Ok(path) => success!("Links written to {}", path.display()),
            Err(e) => warning!("Cannot write links to {}: {}", path.display(), e),
        }
    }

    if options.dry_run {
        for link in &links {
            println!("{}", link);
        }
        return;
    }

    let mode = if options.link_file {
        LinkMode::File
    } else {
        LinkMode::Args
    };
    let downloader = Downloader::new(
        options.downloader.unwrap_or_else(config::downloader),
        mode,
    );

    info!(
        "Downloading {} tracks with {}...",
        links.len(),
        downloader.program()
    );
    match downloader.download(&links).await {
        Ok(_) => success!("Download finished"),
        Err(e) => error!("Download failed. Err: {}", e),
    }
}
