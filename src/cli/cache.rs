use tabled::Table;

use crate::{
    cli::pipeline::{self, CacheOptions},
    error, info,
    management::LinkStore,
    success,
    types::CacheTableRow,
    warning,
};

/// Prints the cached link of a track.
pub async fn cache_get(options: CacheOptions, track_id: String) {
    let cache = pipeline::open_cache(&options, 1).await;
    match cache.get(&track_id).await {
        Ok(Some(link)) => println!("{}", link),
        Ok(None) => warning!("No cached link for {}", track_id),
        Err(e) => error!("Cannot read link cache. Err: {}", e),
    }
    cache.close().await;
}

/// Stores or replaces the link of a track, e.g. to fix a wrong match.
pub async fn cache_put(options: CacheOptions, track_id: String, link: String) {
    if link.trim().is_empty() {
        error!("Refusing to cache an empty link for {}", track_id);
    }

    let cache = pipeline::open_cache(&options, 1).await;
    match cache.put(&track_id, link.trim()).await {
        Ok(()) => success!("Cached {} -> {}", track_id, link.trim()),
        Err(e) => error!("Cannot write link cache. Err: {}", e),
    }
    cache.close().await;
}

/// Lists cached entries, optionally filtered by a substring of id or link.
pub async fn cache_list(options: CacheOptions, search: Option<String>) {
    let cache = pipeline::open_cache(&options, 1).await;
    let mut entries = match cache.entries().await {
        Ok(entries) => entries,
        Err(e) => error!("Cannot read link cache. Err: {}", e),
    };
    cache.close().await;

    if let Some(search) = search {
        let term = search.to_lowercase();
        entries.retain(|(id, link)| {
            id.to_lowercase().contains(&term) || link.to_lowercase().contains(&term)
        });
    }

    let rows: Vec<CacheTableRow> = entries
        .into_iter()
        .map(|(track, link)| CacheTableRow { track, link })
        .collect();

    println!("{}", Table::new(rows));
}

pub async fn cache_stats(options: CacheOptions) {
    let cache = pipeline::open_cache(&options, 1).await;
    match cache.count().await {
        Ok(count) => info!("Cached links: {}", count),
        Err(e) => error!("Cannot read link cache. Err: {}", e),
    }
    cache.close().await;
}
