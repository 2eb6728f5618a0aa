use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use medialib_api::types::CoverKind;

#[derive(Parser, Debug)]
#[command(name = "medialib", version)]
#[command(about = "Browse and play a home media library")]
pub struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API base URL (overrides config)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Launch a local player instead of the server's
    #[arg(long, global = true)]
    pub embedded: bool,

    /// Local player to launch in embedded mode (e.g. mpv, VLC)
    #[arg(long, global = true)]
    pub player: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the whole library
    Library,
    /// Show started, unfinished items
    Continue,
    /// List series, or the episodes of one series
    Series {
        /// Series name (case-insensitive)
        name: Option<String>,
    },
    /// List movies
    Movies,
    /// Play an item from its stored position
    Play {
        path: String,
        /// Don't stay around to track progress
        #[arg(long)]
        detach: bool,
    },
    /// Flip the watched flag of an item
    Toggle { path: String },
    /// Mark an item as watched
    MarkWatched { path: String },
    /// Forget stored progress for an item
    Reset { path: String },
    /// Play the episode after the given one
    Next {
        path: String,
        #[arg(long)]
        detach: bool,
    },
    /// Series and movie cover art
    #[command(subcommand)]
    Cover(CoverCommand),
    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum CoverCommand {
    /// Print the stored cover URL
    Get {
        title: String,
        #[arg(long, value_enum, default_value = "series")]
        kind: KindArg,
    },
    /// Store a cover URL
    Set {
        title: String,
        url: String,
        #[arg(long, value_enum, default_value = "series")]
        kind: KindArg,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the user config file location
    Path,
    /// Print the effective configuration
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Movie,
    Series,
}

impl From<KindArg> for CoverKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => CoverKind::Movie,
            KindArg::Series => CoverKind::Series,
        }
    }
}
