use async_trait::async_trait;
use reqwest::Client;

use crate::{error::ResolutionError, types::Candidate, utils, youtube::Discovery};

/// Reads video ids off the public results page.
pub struct YoutubeScraper {
    http: Client,
    results_url: String,
}

impl YoutubeScraper {
    pub fn new(http: Client, host: &str) -> Self {
        Self {
            http,
            results_url: format!("https://{host}/results"),
        }
    }
}

#[async_trait]
impl Discovery for YoutubeScraper {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ResolutionError> {
        let response = self
            .http
            .get(&self.results_url)
            .query(&[("search_query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status { status });
        }

        let page = response.text().await?;
        Ok(utils::extract_video_ids(&page, limit)
            .into_iter()
            .map(Candidate::video)
            .collect())
    }
}
