use std::{collections::HashSet, time::Duration};

use reqwest::{
    Client,
    header::{HeaderMap, RETRY_AFTER},
};

use crate::types::TrackInfo;

/// Longest `Retry-After` we are willing to sleep through.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Upper bound for a single HTTP request, connect and body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client shared by the track source and discovery.
///
/// A stalled request fails with a timeout error after `timeout` instead of
/// holding its worker forever.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
}

/// Joins track name and primary artist with a single space, name first.
pub fn build_query(info: &TrackInfo) -> String {
    match info.artist_name {
        Some(artist) => [info.track_name, artist].join(" "),
        None => info.track_name.to_string(),
    }
}

pub fn watch_link(host: &str, video_id: &str) -> String {
    format!("http://{host}/watch?v={video_id}")
}

/// Seconds requested by a `Retry-After` header, if present and numeric.
pub fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Pulls video ids out of a YouTube results page, in page order, without
/// duplicates, stopping after `limit` ids.
pub fn extract_video_ids(page: &str, limit: usize) -> Vec<String> {
    const MARKERS: [&str; 2] = ["\"videoId\":\"", "/watch?v="];

    let mut found: Vec<(usize, String)> = Vec::new();
    for marker in MARKERS {
        let mut rest = page;
        let mut offset = 0;
        while let Some(pos) = rest.find(marker) {
            let start = pos + marker.len();
            let id: String = rest[start..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if id.len() == 11 {
                found.push((offset + pos, id));
            }
            offset += start;
            rest = &rest[start..];
        }
    }
    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, id)| id)
        .filter(|id| seen.insert(id.clone()))
        .take(limit)
        .collect()
}

/// Links in a stable order, for printing and downloader invocation.
pub fn sorted_links(links: &HashSet<String>) -> Vec<String> {
    let mut links: Vec<String> = links.iter().cloned().collect();
    links.sort();
    links
}
