//! Request and response bodies of the backend API.

use serde::{Deserialize, Deserializer, Serialize};

/// `POST /play` body.
#[derive(Debug, Serialize)]
pub(crate) struct PlayRequest<'a> {
    pub path: &'a str,
    pub start_time: f64,
}

/// `POST /next-episode` and `POST /reset-progress` body.
#[derive(Debug, Serialize)]
pub(crate) struct PathRequest<'a> {
    pub path: &'a str,
}

/// `POST /progress` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub path: String,
    pub position: f64,
    pub duration: f64,
    pub completed: bool,
}

/// External player state as reported by `GET /vlc/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
    #[default]
    #[serde(other)]
    Unknown,
}

/// `GET /vlc/status` response (the player's own status document, trimmed).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PlayerStatus {
    #[serde(default)]
    pub state: PlayerState,
    /// Position in seconds.
    #[serde(default, deserialize_with = "number_or_zero")]
    pub time: f64,
    /// Length in seconds.
    #[serde(default, deserialize_with = "number_or_zero")]
    pub length: f64,
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Successor returned by `POST /next-episode`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NextEpisode {
    pub path: String,
    pub name: String,
}

/// Which cover cache namespace a title lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverKind {
    Movie,
    Series,
}

impl CoverKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }
}

/// `GET /cover` response.
#[derive(Debug, Deserialize)]
pub(crate) struct CoverResponse {
    #[serde(default)]
    pub cover_url: Option<String>,
}

/// `POST /cover` body.
#[derive(Debug, Serialize)]
pub(crate) struct SetCoverRequest<'a> {
    pub title: &'a str,
    #[serde(rename = "type")]
    pub kind: CoverKind,
    pub cover_url: &'a str,
}

/// Error body sent with non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
