use serde::{Deserialize, Deserializer, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub obtained_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Empty for local files, which Spotify lists with a `null` id.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

/// Name and primary artist of a track, the two parts of a search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo<'a> {
    pub track_name: &'a str,
    pub artist_name: Option<&'a str>,
}

impl Track {
    pub fn info(&self) -> TrackInfo<'_> {
        TrackInfo {
            track_name: &self.name,
            artist_name: self.artists.first().map(|a| a.name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// `null` for removed or local-only items.
    pub track: Option<Track>,
}

/// One search hit returned by a discovery backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub video_id: Option<String>,
    pub title: Option<String>,
}

impl Candidate {
    pub fn video(id: impl Into<String>) -> Self {
        Self {
            video_id: Some(id.into()),
            title: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    pub kind: String,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSnippet {
    pub title: Option<String>,
}

#[derive(Tabled)]
pub struct CacheTableRow {
    pub track: String,
    pub link: String,
}
