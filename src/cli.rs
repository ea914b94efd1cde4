use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Multi-source video catalog client
#[derive(Parser)]
#[command(name = "vodhub")]
#[command(about = "Resolve episodes, switch sources and search across video catalogs", long_about = None)]
pub struct Cli {
    /// Config file (defaults to $VODHUB_CONFIG or the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL, overriding the config
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show one window of configured sources
    Sources {
        /// Index of the first source shown
        #[arg(short, long, default_value_t = 0)]
        start: usize,
    },
    /// Resolve an episode from a raw play-list string (no network)
    Resolve {
        play_list: String,
        episode: u32,
    },
    /// Load a video and print the stream for an episode
    Play {
        /// Video id, or a full /play/{id}/{episode}/{source} address
        id: String,
        #[arg(short, long)]
        episode: Option<u32>,
        #[arg(short, long)]
        source: Option<String>,
        /// Also list every episode
        #[arg(long)]
        list: bool,
    },
    /// Load a video, then move it to another source
    Switch {
        id: String,
        /// Target source key
        to: String,
        #[arg(short, long)]
        episode: Option<u32>,
        /// Source to load from first
        #[arg(short, long)]
        from: Option<String>,
    },
    /// Search the catalog
    Search {
        term: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Bypass the search cache
        #[arg(long)]
        refresh: bool,
    },
    /// Show or edit watch history
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        /// Remove the entry for this video id
        #[arg(long)]
        forget: Option<String>,
    },
    /// Clear cached search pages
    CacheClear {
        /// Only keys starting with this prefix (e.g. "moyu|")
        #[arg(long)]
        prefix: Option<String>,
        /// Only drop expired entries
        #[arg(long, conflicts_with = "prefix")]
        expired: bool,
    },
    /// Compact the database
    Vacuum,
}
