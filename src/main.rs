use std::path::PathBuf;

use clap::{
    ArgAction, Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spordl::{
    cli::{self, CacheOptions, DownloadOptions, Target},
    config, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path of the link cache database
    #[clap(long, global = true)]
    database: Option<PathBuf>,

    /// Use a throwaway in-memory cache instead of the database
    #[clap(long, global = true)]
    no_cache: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve tracks to links and hand them to the downloader
    Download(DownloadArgs),

    /// Resolve tracks to links and print them
    Links(LinksArgs),

    /// Inspect and edit the link cache
    Cache(CacheArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Spotify track id; can be repeated
    #[clap(long = "track", action = ArgAction::Append)]
    tracks: Vec<String>,

    /// Spotify playlist id
    #[clap(long)]
    playlist: Option<String>,
}

impl TargetArgs {
    fn into_target(self) -> Target {
        match self.playlist {
            Some(id) => Target::Playlist(id),
            None => Target::Tracks(self.tracks),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DownloadArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Downloader program (defaults to SPORDL_DOWNLOADER or `add_music`)
    #[clap(long)]
    downloader: Option<String>,

    /// Pass links to the downloader through a temporary file
    #[clap(long)]
    link_file: bool,

    /// Also write the resolved links to this file
    #[clap(long)]
    save_links: Option<PathBuf>,

    /// Print links instead of downloading
    #[clap(long)]
    dry_run: bool,

    /// Number of resolution workers
    #[clap(long)]
    workers: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct LinksArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Number of resolution workers
    #[clap(long)]
    workers: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Print the cached link of a track
    Get { track_id: String },

    /// Store or replace the link of a track
    Put { track_id: String, link: String },

    /// List cached links
    List {
        /// Only show entries whose id or link contains this text
        #[clap(long)]
        search: Option<String>,
    },

    /// Show the number of cached links
    Stats,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("spordl={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG may come from the .env file.
    let env_loaded = config::load_env().await;
    init_tracing(cli.verbose);
    if let Err(e) = env_loaded {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cache = CacheOptions {
        database: cli.database,
        no_cache: cli.no_cache,
    };

    match cli.command {
        Command::Download(opt) => {
            cli::download(
                opt.target.into_target(),
                cache,
                DownloadOptions {
                    downloader: opt.downloader,
                    link_file: opt.link_file,
                    dry_run: opt.dry_run,
                    save_links: opt.save_links,
                    workers: opt.workers,
                },
            )
            .await
        }
        Command::Links(opt) => cli::links(opt.target.into_target(), cache, opt.workers).await,
        Command::Cache(opt) => match opt.command {
            CacheSubcommand::Get { track_id } => cli::cache_get(cache, track_id).await,
            CacheSubcommand::Put { track_id, link } => cli::cache_put(cache, track_id, link).await,
            CacheSubcommand::List { search } => cli::cache_list(cache, search).await,
            CacheSubcommand::Stats => cli::cache_stats(cache).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
