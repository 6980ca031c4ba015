#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use spordl::{
    error::{CacheError, ResolutionError, UpstreamError},
    management::LinkStore,
    resolver::LinkResolver,
    spotify::{PAGE_SIZE, TrackSource, collect_pages},
    types::{Candidate, Track, TrackArtist},
    youtube::Discovery,
};

pub const HOST: &str = "youtube.com";

pub fn track(id: &str, name: &str, artist: &str) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        artists: vec![TrackArtist {
            name: artist.to_string(),
        }],
    }
}

pub fn link(video_id: &str) -> String {
    format!("http://{HOST}/watch?v={video_id}")
}

enum Answer {
    Candidates(Vec<Candidate>),
    Fail,
}

/// Discovery backend answering from a fixed table. Unknown queries return
/// no candidates.
#[derive(Default)]
pub struct FakeDiscovery {
    answers: HashMap<String, Answer>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn video(mut self, query: &str, video_id: &str) -> Self {
        self.answers.insert(
            query.to_string(),
            Answer::Candidates(vec![Candidate::video(video_id)]),
        );
        self
    }

    pub fn candidates(mut self, query: &str, candidates: Vec<Candidate>) -> Self {
        self.answers
            .insert(query.to_string(), Answer::Candidates(candidates));
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.answers.insert(query.to_string(), Answer::Fail);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Discovery for FakeDiscovery {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ResolutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.answers.get(query) {
            Some(Answer::Candidates(c)) => Ok(c.iter().take(limit).cloned().collect()),
            Some(Answer::Fail) => Err(ResolutionError::Malformed(format!(
                "backend down for '{query}'"
            ))),
            None => Ok(Vec::new()),
        }
    }
}

pub fn resolver(discovery: &Arc<FakeDiscovery>) -> LinkResolver {
    LinkResolver::new(Arc::clone(discovery) as Arc<dyn Discovery>, HOST)
}

/// Store that always misses and can be told to fail reads or writes.
#[derive(Default)]
pub struct BrokenStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: AtomicUsize,
}

#[async_trait]
impl LinkStore for BrokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_reads {
            return Err(CacheError::Read {
                key: key.to_string(),
                source: sqlx::Error::PoolClosed,
            });
        }
        Ok(None)
    }

    async fn put(&self, key: &str, _value: &str) -> Result<(), CacheError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::Write {
                key: key.to_string(),
                source: sqlx::Error::PoolClosed,
            });
        }
        Ok(())
    }
}

/// Track source serving a single playlist through offset pagination.
pub struct FakeSource {
    pub tracks: Vec<Track>,
    pub pages_served: AtomicUsize,
}

impl FakeSource {
    pub fn with_tracks(count: usize) -> Self {
        Self {
            tracks: (0..count)
                .map(|i| track(&format!("T{i}"), &format!("Song {i}"), "Artist"))
                .collect(),
            pages_served: AtomicUsize::new(0),
        }
    }

    fn page(&self, offset: usize) -> Vec<Track> {
        self.pages_served.fetch_add(1, Ordering::SeqCst);
        self.tracks.iter().skip(offset).take(PAGE_SIZE).cloned().collect()
    }
}

#[async_trait]
impl TrackSource for FakeSource {
    async fn fetch_single(&self, id: &str) -> Result<Option<Track>, UpstreamError> {
        Ok(self.tracks.iter().find(|t| t.id == id).cloned())
    }

    async fn fetch_playlist(&self, _id: &str) -> Result<Vec<Track>, UpstreamError> {
        collect_pages(PAGE_SIZE, |offset| async move {
            Ok::<_, UpstreamError>(self.page(offset))
        })
        .await
    }
}
