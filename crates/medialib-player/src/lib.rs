//! Embedded playback: launching a local media player directly instead of
//! asking the backend to start its external one.

pub mod launch;
pub mod platform;
pub mod player_db;

use thiserror::Error;

pub use launch::CommandPlayer;
pub use player_db::{PlayerDatabase, PlayerDef};

/// An in-process playback capability.
///
/// Implementations own the playback lifecycle; callers never poll them.
pub trait EmbeddedPlayer: Send + Sync {
    /// Display name of the underlying player.
    fn name(&self) -> &str;

    /// Start playing `path` from `start_time` seconds.
    fn play_media(&self, path: &str, start_time: f64) -> Result<(), PlayerError>;
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("{0} is not installed")]
    NotInstalled(String),

    #[error("no supported media player found on PATH")]
    NoPlayerFound,

    #[error("invalid player database {0}")]
    Database(String),

    #[error("failed to launch {player}: {source}")]
    Launch {
        player: String,
        #[source]
        source: std::io::Error,
    },
}
