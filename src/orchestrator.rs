//! Cache-first resolution of a batch of tracks.
//!
//! Every track runs the same sequence on a bounded worker pool: look the id
//! up in the link cache, and on a miss ask the resolver and backfill the
//! cache with the link it found. Per-track failures are counted and logged,
//! never propagated, so one bad track cannot sink the batch.

use std::{collections::HashSet, sync::Arc, time::Duration};

use indicatif::ProgressBar;
use tokio::{
    sync::Semaphore,
    task::{JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;

use crate::{management::LinkStore, resolver::LinkResolver, types::Track};

/// How long tracks still in flight may keep running after a cancellation
/// before their workers are aborted.
pub const IN_FLIGHT_GRACE: Duration = Duration::from_secs(30);

/// What happened to one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Served from the link cache without asking the resolver.
    Cached(String),
    /// Freshly resolved. `stored` is false when the cache write failed.
    Resolved { link: String, stored: bool },
    /// The resolver found no usable candidate. Nothing was cached.
    NotFound,
    /// The resolver failed. Nothing was cached.
    Failed,
}

impl Outcome {
    /// The link this track contributes to the result set, if any.
    pub fn link(&self) -> Option<&str> {
        match self {
            Outcome::Cached(link) | Outcome::Resolved { link, .. } => Some(link),
            Outcome::NotFound | Outcome::Failed => None,
        }
    }
}

/// Result of a batch: the deduplicated links plus per-outcome counters.
///
/// Every input track lands in exactly one of `hits`, `resolved`,
/// `not_found`, `failed` or `skipped`. `write_failures` is a subset of
/// `resolved`.
#[derive(Debug, Default, Clone)]
pub struct Report {
    /// Distinct links found, cached or fresh.
    pub links: HashSet<String>,
    /// Tracks answered by the cache.
    pub hits: usize,
    /// Tracks resolved through the discovery backend.
    pub resolved: usize,
    /// Tracks for which the backend had no usable candidate.
    pub not_found: usize,
    /// Tracks whose resolution returned an error.
    pub failed: usize,
    /// Resolved tracks whose link could not be written to the cache.
    pub write_failures: usize,
    /// Tracks never dispatched, or aborted after the grace period, because
    /// the run was cancelled.
    pub skipped: usize,
}

impl Report {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Cached(link) => {
                self.hits += 1;
                self.links.insert(link);
            }
            Outcome::Resolved { link, stored } => {
                self.resolved += 1;
                if !stored {
                    self.write_failures += 1;
                }
                self.links.insert(link);
            }
            Outcome::NotFound => self.not_found += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    fn collect(&mut self, joined: Result<Outcome, JoinError>) {
        match joined {
            Ok(outcome) => self.record(outcome),
            Err(e) if e.is_cancelled() => self.skipped += 1,
            Err(e) => {
                tracing::warn!("resolution worker panicked: {}", e);
                self.failed += 1;
            }
        }
    }

    /// Tracks that contributed no link.
    pub fn unresolved(&self) -> usize {
        self.not_found + self.failed + self.skipped
    }
}

/// Runs the per-track sequence over a batch on a bounded pool of workers.
pub struct Orchestrator {
    store: Arc<dyn LinkStore>,
    resolver: LinkResolver,
    workers: usize,
    grace: Duration,
    progress: ProgressBar,
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `store` - Link cache shared by every worker
    /// * `resolver` - Resolver consulted on cache misses
    /// * `workers` - Maximum number of tracks processed at once (at least 1)
    ///
    /// # Example
    ///
    /// ```
    /// let cache = LinkCache::open(&config::database_path(), 8).await?;
    /// let orchestrator = Orchestrator::new(Arc::new(cache), resolver, 8);
    /// let links = orchestrator.resolve_all(tracks).await;
    /// ```
    pub fn new(store: Arc<dyn LinkStore>, resolver: LinkResolver, workers: usize) -> Self {
        Self {
            store,
            resolver,
            workers: workers.max(1),
            grace: IN_FLIGHT_GRACE,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once per finished track.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Sets how long in-flight tracks may run on after a cancellation.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Resolves every track and returns the set of links found.
    pub async fn resolve_all(&self, tracks: Vec<Track>) -> HashSet<String> {
        self.run(tracks, &CancellationToken::new()).await.links
    }

    /// Resolves `tracks`, stopping dispatch of new tracks once `cancel` fires.
    ///
    /// Tracks already in flight get the grace period to finish; their links
    /// are kept. Workers still running after it are aborted and counted as
    /// skipped. An aborted worker never leaves a partial cache entry since
    /// every write is a single statement.
    pub async fn run(&self, tracks: Vec<Track>, cancel: &CancellationToken) -> Report {
        let total = tracks.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut workers = JoinSet::new();
        let mut dispatched = 0;

        for track in tracks {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let store = Arc::clone(&self.store);
            let resolver = self.resolver.clone();
            let progress = self.progress.clone();
            workers.spawn(async move {
                let outcome = resolve_one(store.as_ref(), &resolver, &track).await;
                drop(permit);
                progress.inc(1);
                outcome
            });
            dispatched += 1;
        }

        let mut report = Report {
            skipped: total - dispatched,
            ..Report::default()
        };
        if report.skipped > 0 {
            tracing::info!(skipped = report.skipped, "resolution cancelled");
        }

        let grace = self.grace;
        let deadline = async move {
            cancel.cancelled().await;
            tokio::time::sleep(grace).await;
        };
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = workers.join_next() => match joined {
                    Some(joined) => report.collect(joined),
                    None => break,
                },
                _ = &mut deadline => {
                    tracing::warn!(in_flight = workers.len(), "aborting tracks still in flight");
                    workers.abort_all();
                    while let Some(joined) = workers.join_next().await {
                        report.collect(joined);
                    }
                    break;
                }
            }
        }

        report
    }
}

/// Cache lookup, then resolve-and-backfill on a miss.
pub async fn resolve_one(store: &dyn LinkStore, resolver: &LinkResolver, track: &Track) -> Outcome {
    match store.get(&track.id).await {
        Ok(Some(link)) if !link.is_empty() => {
            tracing::debug!(track = %track.id, "cache hit");
            return Outcome::Cached(link);
        }
        Ok(_) => tracing::debug!(track = %track.id, "cache miss"),
        // A broken read only costs a lookup; the resolver still gets a go.
        Err(e) => tracing::warn!(track = %track.id, "{}", e),
    }

    let link = match resolver.resolve(track).await {
        Ok(Some(link)) if !link.is_empty() => link,
        Ok(_) => return Outcome::NotFound,
        Err(e) => {
            tracing::warn!(track = %track.id, name = %track.name, "{}", e);
            return Outcome::Failed;
        }
    };

    let stored = match store.put(&track.id, &link).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(track = %track.id, "{}", e);
            false
        }
    };

    Outcome::Resolved { link, stored }
}
