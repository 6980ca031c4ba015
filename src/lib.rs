//! spordl library
//!
//! This library resolves Spotify tracks and playlists to YouTube watch links,
//! caches every resolution in a local SQLite database, and hands the links to
//! an external downloader.
//!
//! # Modules
//!
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `downloader` - Invocation of the external downloader program
//! - `error` - Error types for every stage of a run
//! - `management` - Persistent state: link cache and Spotify token
//! - `orchestrator` - Cache-first resolution of a batch on a worker pool
//! - `resolver` - Track to link resolution through a discovery backend
//! - `spotify` - Spotify Web API track source
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//! - `youtube` - Link discovery backends
//!
//! # Example
//!
//! ```
//! use spordl::cli::{self, CacheOptions, Target};
//!
//! #[tokio::main]
//! async fn main() {
//!     spordl::config::load_env().await.ok();
//!     cli::links(Target::Playlist("37i9dQZF1DXcBWIGoYBM5M".into()), CacheOptions::default(), None).await;
//! }
//! ```

pub mod cli;
pub mod config;
pub mod downloader;
pub mod error;
pub mod management;
pub mod orchestrator;
pub mod resolver;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod youtube;

// Status output goes to stderr so that stdout carries only data (links,
// tables, completions) and can be piped.

/// Prints a status line with a blue `o`.
///
/// ```
/// info!("Playlist {} has {} tracks", id, count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a green `✓` line.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and exits with code 1.
///
/// Reserved for failures that make the whole run pointless, such as an
/// unopenable link cache or an unreachable track source. The expression has
/// type `!`, so it can end a `match` arm that would otherwise yield a value.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the run survives.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
