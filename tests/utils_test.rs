mod common;

use std::{collections::HashSet, sync::atomic::Ordering};

use common::FakeSource;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use spordl::{
    cli::{Target, fetch_from},
    spotify::{PAGE_SIZE, TrackSource, collect_pages},
    types::TrackInfo,
    utils::*,
};

#[test]
fn test_build_query() {
    let info = TrackInfo {
        track_name: "Song A",
        artist_name: Some("Artist X"),
    };
    assert_eq!(build_query(&info), "Song A Artist X");

    let no_artist = TrackInfo {
        track_name: "Song A",
        artist_name: None,
    };
    assert_eq!(build_query(&no_artist), "Song A");
}

#[test]
fn test_watch_link() {
    assert_eq!(
        watch_link("youtube.com", "abc123"),
        "http://youtube.com/watch?v=abc123"
    );
}

#[test]
fn test_retry_after() {
    let mut headers = HeaderMap::new();
    assert_eq!(retry_after(&headers), None);

    headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
    assert_eq!(retry_after(&headers), Some(7));

    headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
    assert_eq!(retry_after(&headers), None);
}

#[test]
fn test_extract_video_ids_in_page_order_without_duplicates() {
    let page = r#"
        <a href="/watch?v=AAAAAAAAAAA">first</a>
        {"videoId":"BBBBBBBBBBB","title":"second"}
        {"videoId":"AAAAAAAAAAA"}
        <a href="/watch?v=CCCCCCCCC_-">third</a>
        {"videoId":"short"}
    "#;

    assert_eq!(
        extract_video_ids(page, 10),
        vec!["AAAAAAAAAAA", "BBBBBBBBBBB", "CCCCCCCCC_-"]
    );
    assert_eq!(extract_video_ids(page, 1), vec!["AAAAAAAAAAA"]);
    assert!(extract_video_ids("<html>no results</html>", 5).is_empty());
}

#[test]
fn test_sorted_links() {
    let links: HashSet<String> = ["b", "c", "a"].iter().map(|s| s.to_string()).collect();
    assert_eq!(sorted_links(&links), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_collect_pages_stops_on_short_page() {
    let data: Vec<usize> = (0..250).collect();
    let mut offsets = Vec::new();

    let all = collect_pages(PAGE_SIZE, |offset| {
        offsets.push(offset);
        let page: Vec<usize> = data.iter().skip(offset).take(PAGE_SIZE).copied().collect();
        async move { Ok::<_, String>(page) }
    })
    .await
    .unwrap();

    assert_eq!(offsets, vec![0, 100, 200]);
    assert_eq!(all, data);
}

#[tokio::test]
async fn test_collect_pages_full_last_page_asks_once_more() {
    let data: Vec<usize> = (0..200).collect();
    let mut calls = 0;

    let all = collect_pages(PAGE_SIZE, |offset| {
        calls += 1;
        let page: Vec<usize> = data.iter().skip(offset).take(PAGE_SIZE).copied().collect();
        async move { Ok::<_, String>(page) }
    })
    .await
    .unwrap();

    assert_eq!(calls, 3);
    assert_eq!(all.len(), 200);
}

#[tokio::test]
async fn test_collect_pages_propagates_errors() {
    let result = collect_pages(PAGE_SIZE, |offset| async move {
        if offset == 0 {
            Ok(vec![0; PAGE_SIZE])
        } else {
            Err("upstream down".to_string())
        }
    })
    .await;

    assert_eq!(result, Err("upstream down".to_string()));
}

#[tokio::test]
async fn test_playlist_of_250_tracks_is_fetched_whole() {
    let source = FakeSource::with_tracks(250);

    let tracks = source.fetch_playlist("P1").await.unwrap();

    assert_eq!(source.pages_served.load(Ordering::SeqCst), 3);
    assert_eq!(tracks, source.tracks);
    let ids: HashSet<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), 250);
}

#[tokio::test]
async fn test_fetch_from_skips_unknown_single_tracks() {
    let source = FakeSource::with_tracks(3);

    let tracks = fetch_from(
        &source,
        &Target::Tracks(vec!["T0".to_string(), "missing".to_string(), "T2".to_string()]),
    )
    .await;

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["T0", "T2"]);
}
