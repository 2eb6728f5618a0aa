//! Wiring between the library store, the backend client and a player.
//!
//! Front-ends call [`start`] once with the loaded config and then drive the
//! returned controller.

mod controller;
mod notify;

use medialib_api::{ApiError, BackendClient};
use medialib_core::config::{AppConfig, PlaybackMode};
use medialib_player::{CommandPlayer, PlayerDatabase, PlayerError};

pub use controller::{Controller, PlaybackSession, PlaybackSettings, PlayerMode, PollOutcome};
pub use notify::{Notifier, ToastKind};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("player error: {0}")]
    Player(#[from] PlayerError),
}

/// Controller talking to the real HTTP backend.
pub type Runtime<N> = Controller<BackendClient, N>;

/// Build a controller from config. The library is not loaded yet.
pub fn start<N: Notifier>(config: &AppConfig, notifier: N) -> Result<Runtime<N>, RuntimeError> {
    let client = BackendClient::new(&config.server.base_url, config.server.request_timeout())?;
    let player = player_mode(config)?;
    tracing::info!(
        server = client.base_url(),
        mode = ?player,
        "Runtime started"
    );
    Ok(Controller::new(
        client,
        player,
        notifier,
        PlaybackSettings::from_config(&config.playback),
    ))
}

fn player_mode(config: &AppConfig) -> Result<PlayerMode, RuntimeError> {
    match config.playback.mode {
        PlaybackMode::External => Ok(PlayerMode::External),
        PlaybackMode::Embedded => {
            let db = PlayerDatabase::load(&AppConfig::players_path())?;
            let player = CommandPlayer::resolve(
                &db,
                config.player.preferred.as_deref(),
                config.player.extra_args.clone(),
            )?;
            Ok(PlayerMode::Embedded(Box::new(player)))
        }
    }
}
