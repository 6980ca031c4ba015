//! Configuration management for spordl.
//!
//! Values are read from environment variables, which can be seeded from a
//! `.env` file in the local data directory. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Required values that are missing yield a [`ConfigError`] instead of
//! panicking, so commands that never touch Spotify (like `cache get`) work
//! without credentials.

use std::{env, path::PathBuf, str::FromStr};

use crate::error::ConfigError;

const APP_DIR: &str = "spordl";

/// Which discovery backend(s) resolve search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// YouTube Data API when a key is configured, with scraping as fallback.
    Auto,
    Api,
    Scrape,
}

impl FromStr for DiscoveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "api" => Ok(Self::Api),
            "scrape" => Ok(Self::Scrape),
            other => Err(format!("unknown discovery mode '{other}'")),
        }
    }
}

/// Returns the application's directory under the platform local data dir.
///
/// - Linux: `~/.local/share/spordl`
/// - macOS: `~/Library/Application Support/spordl`
/// - Windows: `%LOCALAPPDATA%/spordl`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Loads environment variables from `<data dir>/spordl/.env`.
///
/// Creates the directory if needed. A missing `.env` file is not an error;
/// variables already present in the process environment always win.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

/// Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Spotify token endpoint used by the client-credentials grant.
pub fn spotify_apitoken_url() -> String {
    or_default(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

pub fn spotify_client_id() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_ID")
}

/// The client secret must never be logged.
pub fn spotify_client_secret() -> Result<String, ConfigError> {
    required("SPOTIFY_CLIENT_SECRET")
}

pub fn spotify_market() -> Option<String> {
    optional("SPOTIFY_MARKET")
}

/// YouTube Data API key. Without it only the scraper is available.
pub fn youtube_api_key() -> Option<String> {
    optional("YT_DEVELOPER_KEY")
}

pub fn youtube_apiurl() -> String {
    or_default("YOUTUBE_API_URL", "https://www.googleapis.com/youtube/v3")
}

/// Host used to build watch links and the scraped results page.
pub fn youtube_host() -> String {
    or_default("YOUTUBE_HOST", "youtube.com")
}

pub fn discovery_mode() -> Result<DiscoveryMode, ConfigError> {
    match optional("SPORDL_DISCOVERY") {
        None => Ok(DiscoveryMode::Auto),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name: "SPORDL_DISCOVERY",
            value,
        }),
    }
}

/// Path of the SQLite link cache.
pub fn database_path() -> PathBuf {
    optional("SPORDL_DATABASE")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join("links.db"))
}

pub fn downloader() -> String {
    or_default("SPORDL_DOWNLOADER", "add_music")
}

/// Size of the resolution worker pool; defaults to the available parallelism.
pub fn workers() -> Result<usize, ConfigError> {
    match optional("SPORDL_WORKERS") {
        None => Ok(default_workers()),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::Invalid {
                name: "SPORDL_WORKERS",
                value,
            }),
        },
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
