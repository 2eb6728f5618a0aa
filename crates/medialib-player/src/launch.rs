use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::platform;
use crate::player_db::{PlayerDatabase, PlayerDef};
use crate::{EmbeddedPlayer, PlayerError};

/// Launches a local player process for each play request.
///
/// The spawned player owns its own lifecycle; a watcher thread only reaps
/// the process and logs how it exited.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    name: String,
    program: PathBuf,
    template: Vec<String>,
    extra_args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(def: &PlayerDef, program: PathBuf, extra_args: Vec<String>) -> Self {
        Self {
            name: def.name.clone(),
            program,
            template: def.args.clone(),
            extra_args,
        }
    }

    /// Pick a player: the preferred one by name, or else the first enabled
    /// player installed on this machine.
    pub fn resolve(
        db: &PlayerDatabase,
        preferred: Option<&str>,
        extra_args: Vec<String>,
    ) -> Result<Self, PlayerError> {
        match preferred.map(str::trim).filter(|p| !p.is_empty()) {
            Some(name) => {
                let def = db
                    .find_by_name(name)
                    .ok_or_else(|| PlayerError::UnknownPlayer(name.to_string()))?;
                let program = platform::locate(def)
                    .ok_or_else(|| PlayerError::NotInstalled(def.name.clone()))?;
                Ok(Self::new(def, program, extra_args))
            }
            None => {
                let (def, program) = platform::installed(db)
                    .into_iter()
                    .next()
                    .ok_or(PlayerError::NoPlayerFound)?;
                Ok(Self::new(def, program, extra_args))
            }
        }
    }

    /// Expand the argument template for one play request.
    pub fn build_args(&self, path: &str, start_time: f64) -> Vec<String> {
        let start = start_time.max(0.0);
        let seconds = (start.floor() as u64).to_string();
        let millis = ((start * 1000.0).round() as u64).to_string();

        let mut has_file = false;
        let mut args = self.extra_args.clone();
        for arg in &self.template {
            if arg.contains("{file}") {
                has_file = true;
            }
            args.push(
                arg.replace("{seconds}", &seconds)
                    .replace("{millis}", &millis)
                    .replace("{file}", path),
            );
        }
        if !has_file {
            args.push(path.to_string());
        }
        args
    }
}

impl EmbeddedPlayer for CommandPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn play_media(&self, path: &str, start_time: f64) -> Result<(), PlayerError> {
        let args = self.build_args(path, start_time);
        tracing::info!(
            player = %self.name,
            program = %self.program.display(),
            ?args,
            "Launching embedded player"
        );

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlayerError::Launch {
                player: self.name.clone(),
                source,
            })?;

        let name = self.name.clone();
        let spawned = std::thread::Builder::new()
            .name("player-wait".into())
            .spawn(move || match child.wait() {
                Ok(status) => tracing::debug!(player = %name, %status, "Player exited"),
                Err(e) => tracing::warn!(player = %name, error = %e, "Failed to wait on player"),
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "Could not spawn player watcher thread");
        }
        Ok(())
    }
}
