use std::sync::Arc;

use crate::{
    cli::pipeline::{self, CacheOptions, Target},
    utils, warning,
};

/// Resolves the target tracks and prints one link per line.
pub async fn links(target: Target, cache: CacheOptions, workers: Option<usize>) {
    let http = pipeline::http_client();
    let workers = pipeline::worker_count(workers);
    let store = pipeline::open_cache(&cache, workers as u32).await;

    let tracks = pipeline::fetch_tracks(&http, &target).await;
    if tracks.is_empty() {
        warning!("No tracks found");
        return;
    }

    let report = pipeline::resolve(&http, Arc::new(store.clone()), tracks, workers).await;
    store.close().await;

    for link in utils::sorted_links(&report.links) {
        println!("{}", link);
    }
    pipeline::summarize(&report);
}
