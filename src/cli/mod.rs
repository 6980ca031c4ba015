//! # CLI Module
//!
//! Command implementations for spordl. Each command wires the library parts
//! together (track source, link cache, resolver, downloader) and reports
//! progress and failures to the terminal.
//!
//! ## Commands
//!
//! - [`download`] - fetch tracks, resolve links, run the downloader
//! - [`links`] - fetch tracks and print the resolved links
//! - [`cache_get`], [`cache_put`], [`cache_list`], [`cache_stats`] - inspect
//!   and seed the link cache
//!
//! ## Data Flow
//!
//! ```text
//! Spotify (tracks) → link cache → [miss] → YouTube search → link cache
//!                                                        ↓
//!                                           deduplicated links → downloader
//! ```
//!
//! ## Error Handling
//!
//! Failures that make a run pointless (no cache, Spotify unreachable, broken
//! configuration) end the program through `error!`. Failures of single tracks
//! are counted and summarised after resolution, and the resolvable rest of
//! the batch is still downloaded.
//!
//! ## Usage
//!
//! ```bash
//! spordl download --playlist 37i9dQZF1DXcBWIGoYBM5M
//! spordl download --track 4uLU6hMCjMI75M1A2tKUQC --dry-run
//! spordl links --playlist 37i9dQZF1DXcBWIGoYBM5M > links.txt
//! spordl cache list --search youtube
//! ```

mod cache;
mod download;
mod links;
mod pipeline;

pub use cache::cache_get;
pub use cache::cache_list;
pub use cache::cache_put;
pub use cache::cache_stats;
pub use download::DownloadOptions;
pub use download::download;
pub use links::links;
pub use pipeline::CacheOptions;
pub use pipeline::Target;
pub use pipeline::fetch_from;
