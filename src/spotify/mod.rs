//! # Spotify Integration Module
//!
//! Fetches the tracks a run works on: a single track by id, or every track of
//! a playlist. Playlist pagination is handled here, so callers only ever see
//! the flattened, ordered track list.
//!
//! ## Architecture
//!
//! ```text
//! CLI Layer
//!     ↓
//! TrackSource (trait)
//!     ↓
//! SpotifyClient ── TokenManager (client-credentials grant)
//!     ↓
//! Spotify Web API
//! ```
//!
//! ## Error Handling
//!
//! - **Rate Limiting**: 429 responses are retried after the `Retry-After`
//!   delay (up to 120 seconds)
//! - **Bad Gateway**: 502 responses are retried after a short pause
//! - **Expired Tokens**: a 401 drops the cached token and retries once
//! - Everything else surfaces as [`UpstreamError`], which is fatal to a run
//!
//! ## API Coverage
//!
//! - `GET /tracks/{id}` - single track
//! - `GET /playlists/{id}/tracks` - playlist items, 100 per page
//! - `POST /api/token` - client-credentials token

pub mod tracks;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    config,
    error::UpstreamError,
    management::{Credentials, TokenManager},
    types::Track,
    utils, warning,
};

pub use tracks::{PAGE_SIZE, collect_pages};

const MAX_ATTEMPTS: u32 = 4;
const BAD_GATEWAY_PAUSE: Duration = Duration::from_secs(10);

/// Source of the tracks a run resolves.
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Returns `None` when the track does not exist.
    async fn fetch_single(&self, id: &str) -> Result<Option<Track>, UpstreamError>;

    /// Returns every track of the playlist in playlist order.
    async fn fetch_playlist(&self, id: &str) -> Result<Vec<Track>, UpstreamError>;
}

pub struct SpotifyClient {
    http: Client,
    api_url: String,
    market: Option<String>,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: String, market: Option<String>, tokens: TokenManager) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            market,
            tokens: Mutex::new(tokens),
        }
    }

    pub async fn from_env(http: Client) -> Result<Self, UpstreamError> {
        let tokens = TokenManager::load(Credentials::from_env()?).await;
        Ok(Self::new(
            http,
            config::spotify_apiurl(),
            config::spotify_market(),
            tokens,
        ))
    }

    /// GETs `path` and decodes the JSON body. `Ok(None)` for 404 and 400,
    /// which Spotify returns for unknown or malformed ids.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, UpstreamError> {
        let url = format!("{}{}", self.api_url, path);
        let mut query = query.to_vec();
        if let Some(market) = &self.market {
            query.push(("market", market.clone()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let token = self.tokens.lock().await.get_valid_token(&self.http).await?;
            let response = self
                .http
                .get(&url)
                .query(&query)
                .bearer_auth(token)
                .send()
                .await?;

            match response.status() {
                status if status.is_success() => return Ok(Some(Self::decode(response).await?)),
                StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => return Ok(None),
                status if attempt >= MAX_ATTEMPTS => {
                    return Err(UpstreamError::Status { status, url });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = utils::retry_after(response.headers()).unwrap_or(1);
                    if retry_after > utils::MAX_RETRY_AFTER_SECS {
                        warning!(
                            "Retry after has reached an abnormal high of {} seconds. Try again later.",
                            retry_after
                        );
                        return Err(UpstreamError::Status {
                            status: StatusCode::TOO_MANY_REQUESTS,
                            url,
                        });
                    }
                    tracing::debug!(retry_after, "rate limited by Spotify");
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY => sleep(BAD_GATEWAY_PAUSE).await,
                StatusCode::UNAUTHORIZED => self.tokens.lock().await.invalidate(),
                status => return Err(UpstreamError::Status { status, url }),
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn fetch_single(&self, id: &str) -> Result<Option<Track>, UpstreamError> {
        tracks::get_track(self, id).await
    }

    async fn fetch_playlist(&self, id: &str) -> Result<Vec<Track>, UpstreamError> {
        tracks::get_playlist_tracks(self, id).await
    }
}
