use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::MediaItem;
use crate::error::CoreError;

/// Season number → episodes in catalog order.
pub type Seasons = BTreeMap<u32, Vec<MediaItem>>;

/// The full library listing as served by `GET /library`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub series: BTreeMap<String, Seasons>,
    #[serde(default)]
    pub movies: Vec<MediaItem>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve a path to its item: series → seasons → episodes, then movies.
    pub fn find_by_path(&self, path: &str) -> Option<&MediaItem> {
        self.episodes()
            .map(|(_, ep)| ep)
            .find(|ep| ep.path == path)
            .or_else(|| self.movies.iter().find(|m| m.path == path))
    }

    /// Every episode paired with its series name, seasons ascending.
    pub fn episodes(&self) -> impl Iterator<Item = (&str, &MediaItem)> {
        self.series.iter().flat_map(|(name, seasons)| {
            seasons
                .values()
                .flatten()
                .map(move |ep| (name.as_str(), ep))
        })
    }

    pub fn episode_count(&self) -> usize {
        self.series
            .values()
            .flat_map(|seasons| seasons.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.movies.is_empty()
    }
}
