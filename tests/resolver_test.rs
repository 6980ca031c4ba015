mod common;

use std::{sync::Arc, time::Duration};

use common::{FakeDiscovery, link, resolver, track};
use spordl::{
    error::ResolutionError,
    resolver::{LinkResolver, SEARCH_LIMIT},
    types::{Candidate, Track},
    utils::http_client,
    youtube::{Discovery, Fallback, YoutubeScraper},
};
use tokio::net::TcpListener;

#[test]
fn test_query_is_name_then_primary_artist() {
    let mut t = track("T1", "Song A", "Artist X");
    t.artists.push(spordl::types::TrackArtist {
        name: "Featured Y".to_string(),
    });

    assert_eq!(LinkResolver::query(&t), "Song A Artist X");
}

#[test]
fn test_query_without_artist_is_the_name() {
    let t = Track {
        id: "T1".to_string(),
        name: "Song A".to_string(),
        artists: Vec::new(),
    };

    assert_eq!(LinkResolver::query(&t), "Song A");
}

#[tokio::test]
async fn test_resolve_takes_first_candidate() {
    let discovery = Arc::new(FakeDiscovery::new().candidates(
        "Song A Artist X",
        vec![Candidate::video("abc123"), Candidate::video("zzz999")],
    ));

    let found = resolver(&discovery)
        .resolve(&track("T1", "Song A", "Artist X"))
        .await
        .unwrap();

    assert_eq!(found, Some(link("abc123")));
    assert_eq!(discovery.queries(), vec!["Song A Artist X".to_string()]);
}

#[tokio::test]
async fn test_resolve_without_candidates_finds_nothing() {
    let discovery = Arc::new(FakeDiscovery::new());

    let found = resolver(&discovery)
        .resolve(&track("T2", "Unknown", "Nobody"))
        .await
        .unwrap();

    assert_eq!(found, None);
    assert_eq!(discovery.calls(), 1);
}

#[tokio::test]
async fn test_resolve_malformed_first_candidate_finds_nothing() {
    let malformed = Candidate {
        video_id: None,
        title: Some("a channel".to_string()),
    };
    let discovery = Arc::new(
        FakeDiscovery::new()
            .candidates("Song A Artist X", vec![malformed, Candidate::video("abc123")]),
    );

    let found = resolver(&discovery)
        .resolve(&track("T1", "Song A", "Artist X"))
        .await
        .unwrap();

    assert_eq!(found, None);
}

#[tokio::test]
async fn test_resolve_propagates_backend_failure_without_retry() {
    let discovery = Arc::new(FakeDiscovery::new().failing("Song A Artist X"));

    let result = resolver(&discovery)
        .resolve(&track("T1", "Song A", "Artist X"))
        .await;

    assert!(result.is_err());
    assert_eq!(discovery.calls(), 1);
}

#[tokio::test]
async fn test_resolve_with_many_candidates_uses_first() {
    let many: Vec<Candidate> = (0..20).map(|i| Candidate::video(format!("v{i}"))).collect();
    let discovery = Arc::new(FakeDiscovery::new().candidates("Song A Artist X", many));

    let found = resolver(&discovery)
        .with_limit(SEARCH_LIMIT)
        .resolve(&track("T1", "Song A", "Artist X"))
        .await
        .unwrap();

    assert_eq!(found, Some(link("v0")));
}

#[tokio::test]
async fn test_fallback_used_only_when_primary_fails() {
    let primary = FakeDiscovery::new()
        .video("Song A Artist X", "primary01")
        .failing("Song B Artist Y");
    let secondary = FakeDiscovery::new()
        .video("Song A Artist X", "second001")
        .video("Song B Artist Y", "second002");
    let fallback = Fallback::new(primary, secondary);

    let a = fallback.search("Song A Artist X", 5).await.unwrap();
    let b = fallback.search("Song B Artist Y", 5).await.unwrap();

    assert_eq!(a, vec![Candidate::video("primary01")]);
    assert_eq!(b, vec![Candidate::video("second002")]);
}

#[tokio::test]
async fn test_fallback_fails_when_both_backends_fail() {
    let fallback = Fallback::new(
        FakeDiscovery::new().failing("Song A Artist X"),
        FakeDiscovery::new().failing("Song A Artist X"),
    );

    let result = fallback.search("Song A Artist X", 5).await;

    assert!(matches!(result, Err(ResolutionError::Exhausted { .. })));
}

#[tokio::test]
async fn test_stalled_backend_times_out_as_resolution_error() {
    // Accepts connections and never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let http = http_client(Duration::from_millis(200)).unwrap();
    let scraper: Arc<dyn Discovery> = Arc::new(YoutubeScraper::new(http, &host));
    let resolver = LinkResolver::new(scraper, host);

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        resolver.resolve(&track("T1", "Song A", "Artist X")),
    )
    .await
    .expect("request must time out on its own");

    assert!(matches!(result, Err(ResolutionError::Request(_))));
}
