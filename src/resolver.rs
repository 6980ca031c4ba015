use std::sync::Arc;

use crate::{error::ResolutionError, types::Track, utils, youtube::Discovery};

/// Number of candidates requested from the discovery backend per query.
pub const SEARCH_LIMIT: usize = 5;

/// Translates a track into a watch link through a discovery backend.
///
/// Stateless apart from the backend call; never retries.
#[derive(Clone)]
pub struct LinkResolver {
    discovery: Arc<dyn Discovery>,
    host: String,
    limit: usize,
}

impl LinkResolver {
    pub fn new(discovery: Arc<dyn Discovery>, host: impl Into<String>) -> Self {
        Self {
            discovery,
            host: host.into(),
            limit: SEARCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn query(track: &Track) -> String {
        utils::build_query(&track.info())
    }

    /// Returns the link of the first candidate, or `None` when the backend
    /// found nothing or the first candidate carries no video id.
    ///
    /// Backend failures, timeouts included, come back as
    /// [`ResolutionError`] without a retry.
    ///
    /// # Example
    ///
    /// ```
    /// let resolver = LinkResolver::new(discovery, "youtube.com");
    /// if let Some(link) = resolver.resolve(&track).await? {
    ///     println!("{} -> {}", track.name, link);
    /// }
    /// ```
    pub async fn resolve(&self, track: &Track) -> Result<Option<String>, ResolutionError> {
        let query = Self::query(track);
        let candidates = self.discovery.search(&query, self.limit).await?;

        let link = candidates
            .into_iter()
            .next()
            .and_then(|c| c.video_id)
            .filter(|id| !id.is_empty())
            .map(|id| utils::watch_link(&self.host, &id));

        if link.is_none() {
            tracing::debug!(track = %track.id, %query, "no usable search result");
        }
        Ok(link)
    }
}
