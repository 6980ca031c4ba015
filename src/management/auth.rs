use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{config, error::UpstreamError, types::Token};

/// Client id and secret for the client-credentials grant.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, UpstreamError> {
        Ok(Self {
            client_id: config::spotify_client_id()?,
            client_secret: config::spotify_client_secret()?,
            token_url: config::spotify_apitoken_url(),
        })
    }
}

pub struct TokenManager {
    credentials: Credentials,
    token: Option<Token>,
}

impl TokenManager {
    /// Picks up a token persisted by a previous run, if any.
    pub async fn load(credentials: Credentials) -> Self {
        let token = match async_fs::read_to_string(Self::token_path()).await {
            Ok(content) => serde_json::from_str::<Token>(&content).ok(),
            Err(_) => None,
        };
        TokenManager { credentials, token }
    }

    pub async fn persist(&self) -> Result<(), String> {
        let Some(token) = &self.token else {
            return Ok(());
        };

        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(token).map_err(|e| e.to_string())?;
        async_fs::write(path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, requesting a new one when the current token
    /// is missing or about to expire.
    pub async fn get_valid_token(&mut self, client: &Client) -> Result<String, UpstreamError> {
        let expired = self.token.as_ref().is_none_or(Self::is_expired);
        if expired {
            let token = self.request_token(client).await?;
            self.token = Some(token);
            if let Err(e) = self.persist().await {
                tracing::warn!("cannot persist Spotify token: {}", e);
            }
        }

        self.token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| UpstreamError::Auth("no token available".to_string()))
    }

    /// Drops the current token so the next call requests a fresh one.
    pub fn invalidate(&mut self) {
        self.token = None;
    }

    fn is_expired(token: &Token) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + 240 >= token.obtained_at + token.expires_in
    }

    async fn request_token(&self, client: &Client) -> Result<Token, UpstreamError> {
        let res = client
            .post(&self.credentials.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::Auth(format!(
                "token endpoint answered {}",
                res.status()
            )));
        }

        let mut token: Token = res
            .json()
            .await
            .map_err(|e| UpstreamError::Auth(e.to_string()))?;
        token.obtained_at = Utc::now().timestamp() as u64;
        Ok(token)
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }
}
