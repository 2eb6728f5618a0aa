use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp;

/// A playable file in the catalog: an episode or a movie.
///
/// Episodes carry `season`/`episode`; movies leave both unset. The `path`
/// is the catalog-wide key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Total length in seconds, `0.0` when the server hasn't learned it yet.
    #[serde(default, deserialize_with = "number_or_zero")]
    pub duration: f64,
    /// Last known playback position in seconds.
    #[serde(default, deserialize_with = "number_or_zero")]
    pub current_time: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "timestamp")]
    pub last_played: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp")]
    pub modified: Option<NaiveDateTime>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

impl MediaItem {
    /// A bare item with no progress, mainly for building catalogs by hand.
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size: 0,
            duration: 0.0,
            current_time: 0.0,
            completed: false,
            last_played: None,
            modified: None,
            cover_url: None,
            season: None,
            episode: None,
        }
    }

    /// Watched fraction in percent, derived from `current_time / duration`.
    ///
    /// Always `0.0` when the duration is unknown.
    pub fn progress_percent(&self) -> f64 {
        if self.duration > 0.0 {
            self.current_time / self.duration * 100.0
        } else {
            0.0
        }
    }

    /// Whole-number percent as shown next to progress bars.
    pub fn display_percent(&self) -> u32 {
        self.progress_percent().round() as u32
    }

    pub fn has_progress(&self) -> bool {
        self.progress_percent() > 0.0
    }

    /// Started but not finished.
    pub fn is_in_progress(&self) -> bool {
        self.current_time > 0.0 && !self.completed
    }

    pub fn known_duration(&self) -> Option<f64> {
        (self.duration > 0.0).then_some(self.duration)
    }

    /// `(season, episode)` when this item is an episode.
    pub fn episode_identity(&self) -> Option<(u32, u32)> {
        self.season.zip(self.episode)
    }
}
