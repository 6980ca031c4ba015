use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::ResolutionError,
    types::{Candidate, SearchListResponse},
    youtube::Discovery,
};

const VIDEO_KIND: &str = "youtube#video";

/// YouTube Data API v3 search client.
pub struct YoutubeApi {
    http: Client,
    api_url: String,
    key: String,
}

impl YoutubeApi {
    pub fn new(http: Client, api_url: String, key: String) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            key,
        }
    }
}

/// Keeps video results only; channels and playlists cannot be downloaded
/// as a single track.
pub fn candidates(response: SearchListResponse) -> Vec<Candidate> {
    response
        .items
        .into_iter()
        .filter(|item| item.id.kind == VIDEO_KIND)
        .map(|item| Candidate {
            video_id: item.id.video_id,
            title: item.snippet.and_then(|s| s.title),
        })
        .collect()
}

#[async_trait]
impl Discovery for YoutubeApi {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, ResolutionError> {
        let max_results = limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.api_url))
            .query(&[
                ("part", "id,snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("key", self.key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolutionError::Status { status });
        }

        let body = response
            .json::<SearchListResponse>()
            .await
            .map_err(|e| ResolutionError::Malformed(e.to_string()))?;

        Ok(candidates(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_video_results() {
        let body = serde_json::json!({
            "items": [
                { "id": { "kind": "youtube#channel", "channelId": "UC1" } },
                { "id": { "kind": "youtube#video", "videoId": "abc123" },
                  "snippet": { "title": "Song A" } },
                { "id": { "kind": "youtube#video" } }
            ]
        });
        let response: SearchListResponse = serde_json::from_value(body).unwrap();

        let found = candidates(response);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].video_id.as_deref(), Some("abc123"));
        assert_eq!(found[0].title.as_deref(), Some("Song A"));
        assert_eq!(found[1].video_id, None);
    }

    #[test]
    fn missing_items_is_an_empty_result() {
        let response: SearchListResponse = serde_json::from_str("{}").unwrap();
        assert!(candidates(response).is_empty());
    }
}
