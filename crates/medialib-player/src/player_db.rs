use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::PlayerError;

const BUNDLED: &str = include_str!("../data/players.toml");

/// A local media player and the command line that starts it at an offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDef {
    pub name: String,
    /// Looked up on `PATH` in this order.
    #[serde(default)]
    pub executables: Vec<String>,
    /// Argument template with `{file}`, `{seconds}` and `{millis}`.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl PlayerDef {
    /// Whether the template passes a start offset at all. Players without
    /// one always start from the beginning.
    pub fn can_resume(&self) -> bool {
        self.args
            .iter()
            .any(|a| a.contains("{seconds}") || a.contains("{millis}"))
    }
}

#[derive(Debug, Deserialize)]
struct PlayersFile {
    #[serde(rename = "player", default)]
    players: Vec<PlayerDef>,
}

/// Players known to embedded mode, in order of preference.
#[derive(Debug, Clone, Default)]
pub struct PlayerDatabase {
    pub players: Vec<PlayerDef>,
}

impl PlayerDatabase {
    /// The list shipped with the binary.
    pub fn embedded() -> Self {
        Self::parse(BUNDLED).expect("bundled players.toml is valid")
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let file: PlayersFile = toml::from_str(text)?;
        Ok(Self {
            players: file.players,
        })
    }

    /// Bundled players, overridden by a user `players.toml` when one exists.
    pub fn load(user_file: &Path) -> Result<Self, PlayerError> {
        let mut db = Self::embedded();
        if !user_file.exists() {
            return Ok(db);
        }
        let text = std::fs::read_to_string(user_file)
            .map_err(|e| PlayerError::Database(format!("{}: {e}", user_file.display())))?;
        let user = Self::parse(&text)
            .map_err(|e| PlayerError::Database(format!("{}: {e}", user_file.display())))?;
        tracing::debug!(path = %user_file.display(), count = user.players.len(), "User players loaded");
        db.apply_overrides(user);
        Ok(db)
    }

    /// A user entry replaces the bundled entry of the same name, so it can
    /// also disable it. Unknown names are appended.
    pub fn apply_overrides(&mut self, user: PlayerDatabase) {
        for def in user.players {
            match self
                .players
                .iter_mut()
                .find(|p| p.name.eq_ignore_ascii_case(&def.name))
            {
                Some(slot) => *slot = def,
                None => self.players.push(def),
            }
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PlayerDef> {
        self.enabled().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn enabled(&self) -> impl Iterator<Item = &PlayerDef> {
        self.players.iter().filter(|p| p.enabled)
    }
}
