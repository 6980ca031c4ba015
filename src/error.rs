//! Error types for the resolution pipeline.
//!
//! Each stage owns its own error enum so callers can decide what is fatal:
//! upstream and cache-open failures abort a run, resolution and cache-write
//! failures only affect the track that raised them.

use std::process::ExitStatus;

use reqwest::StatusCode;

/// Errors raised by the link cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cannot open link cache at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("cannot read cached link for {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: sqlx::Error,
    },

    /// The entry was not persisted. The link it carried may still be used
    /// for the current run.
    #[error("cannot store link for {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Errors raised while discovering a link for a single track.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("discovery request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("discovery backend answered with {status}")]
    Status { status: StatusCode },

    #[error("discovery backend returned unusable data: {0}")]
    Malformed(String),

    #[error("both discovery backends failed: {primary}; {secondary}")]
    Exhausted {
        primary: Box<ResolutionError>,
        secondary: Box<ResolutionError>,
    },
}

/// Errors raised by the track source. All of them are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Spotify is unreachable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("Spotify answered {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("Spotify authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised when handing links to the external downloader.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("cannot start downloader `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write link file: {0}")]
    LinkFile(#[from] std::io::Error),

    #[error("downloader `{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Errors raised while reading configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}
