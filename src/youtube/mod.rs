//! # Link Discovery Module
//!
//! Turns a free-text query into candidate YouTube videos. Every backend
//! implements [`Discovery`], so the resolver never knows which one it talks
//! to:
//!
//! - [`YoutubeApi`] - YouTube Data API v3 `search.list`, needs an API key
//! - [`YoutubeScraper`] - reads the public results page, no key needed but
//!   brittle
//! - [`Fallback`] - asks a primary backend and falls back to a secondary one
//!   when the primary fails

mod api;
mod scrape;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{self, DiscoveryMode},
    error::{ConfigError, ResolutionError},
    types::Candidate,
};

pub use api::YoutubeApi;
pub use scrape::YoutubeScraper;

/// A search capability returning candidates in relevance order.
#[async_trait]
pub trait Discovery: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ResolutionError>;
}

/// Tries `primary` first and only consults `secondary` when it fails.
pub struct Fallback<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> Fallback<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<P: Discovery, S: Discovery> Discovery for Fallback<P, S> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ResolutionError> {
        match self.primary.search(query, limit).await {
            Ok(candidates) => Ok(candidates),
            Err(primary) => {
                tracing::debug!(%primary, query, "primary discovery failed, falling back");
                self.secondary
                    .search(query, limit)
                    .await
                    .map_err(|secondary| ResolutionError::Exhausted {
                        primary: Box::new(primary),
                        secondary: Box::new(secondary),
                    })
            }
        }
    }
}

/// Builds the discovery backend selected by `SPORDL_DISCOVERY`.
pub fn from_env(http: Client) -> Result<Box<dyn Discovery>, ConfigError> {
    let host = config::youtube_host();
    let scraper = YoutubeScraper::new(http.clone(), &host);

    match (config::discovery_mode()?, config::youtube_api_key()) {
        (DiscoveryMode::Scrape, _) | (DiscoveryMode::Auto, None) => Ok(Box::new(scraper)),
        (DiscoveryMode::Api, None) => Err(ConfigError::Missing("YT_DEVELOPER_KEY")),
        (DiscoveryMode::Api, Some(key)) => Ok(Box::new(YoutubeApi::new(
            http,
            config::youtube_apiurl(),
            key,
        ))),
        (DiscoveryMode::Auto, Some(key)) => Ok(Box::new(Fallback::new(
            YoutubeApi::new(http, config::youtube_apiurl(), key),
            scraper,
        ))),
    }
}
