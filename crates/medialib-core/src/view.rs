//! View models derived from a catalog snapshot.
//!
//! Everything here is a pure function of a [`Catalog`]; nothing mutates it.
//! Frontends turn these into text, widgets or markup.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;

use crate::models::{Catalog, MediaItem};

/// Maximum number of entries on the "Continue watching" shelf.
pub const SHELF_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Episode,
    Movie,
}

/// An item on the "Continue watching" shelf.
#[derive(Debug, Clone)]
pub struct ShelfEntry<'a> {
    pub item: &'a MediaItem,
    pub kind: ItemKind,
    /// `"Series - S1E2"` for episodes, the item name for movies.
    pub display_name: String,
}

/// Started, unfinished items, most recently played first, capped at
/// [`SHELF_LIMIT`]. Items never played sort last.
pub fn continue_watching(catalog: &Catalog) -> Vec<ShelfEntry<'_>> {
    let episodes = catalog
        .episodes()
        .filter(|(_, ep)| ep.is_in_progress())
        .map(|(series, ep)| ShelfEntry {
            item: ep,
            kind: ItemKind::Episode,
            display_name: episode_display_name(series, ep),
        });
    let movies = catalog
        .movies
        .iter()
        .filter(|m| m.is_in_progress())
        .map(|m| ShelfEntry {
            item: m,
            kind: ItemKind::Movie,
            display_name: m.name.clone(),
        });

    let mut shelf: Vec<ShelfEntry<'_>> = episodes.chain(movies).collect();
    shelf.sort_by(|a, b| recent_first(a.item.last_played, b.item.last_played));
    shelf.truncate(SHELF_LIMIT);
    shelf
}

fn episode_display_name(series: &str, ep: &MediaItem) -> String {
    match ep.episode_identity() {
        Some((season, episode)) => format!("{series} - S{season}E{episode}"),
        None => format!("{series} - {}", ep.name),
    }
}

/// Descending by timestamp, `None` after every `Some`.
fn recent_first(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Movies in catalog order.
pub fn movie_grid(catalog: &Catalog) -> &[MediaItem] {
    &catalog.movies
}

/// One season of a series listing.
#[derive(Debug, Clone)]
pub struct SeasonView<'a> {
    pub number: u32,
    pub episodes: &'a [MediaItem],
    pub watched: usize,
}

/// One series of the series listing.
#[derive(Debug, Clone)]
pub struct SeriesView<'a> {
    pub name: &'a str,
    /// Most recent `last_played` among its episodes.
    pub latest_played: Option<NaiveDateTime>,
    pub seasons: Vec<SeasonView<'a>>,
    pub total_episodes: usize,
    pub watched_episodes: usize,
}

/// Series ordered by most recently played episode; never-played series
/// follow, alphabetically. Seasons ascend, episodes keep catalog order.
pub fn series_listing(catalog: &Catalog) -> Vec<SeriesView<'_>> {
    let mut listing: Vec<SeriesView<'_>> = catalog
        .series
        .iter()
        .map(|(name, seasons)| {
            let seasons: Vec<SeasonView<'_>> = seasons
                .iter()
                .map(|(number, episodes)| SeasonView {
                    number: *number,
                    episodes: episodes.as_slice(),
                    watched: episodes.iter().filter(|ep| ep.completed).count(),
                })
                .collect();
            let latest_played = seasons
                .iter()
                .flat_map(|s| s.episodes.iter())
                .filter_map(|ep| ep.last_played)
                .max();

            SeriesView {
                name: name.as_str(),
                latest_played,
                total_episodes: seasons.iter().map(|s| s.episodes.len()).sum(),
                watched_episodes: seasons.iter().map(|s| s.watched).sum(),
                seasons,
            }
        })
        .collect();

    listing.sort_by(|a, b| match (a.latest_played, b.latest_played) {
        (None, None) => compare_names(a.name, b.name),
        (a_played, b_played) => recent_first(a_played, b_played),
    });
    listing
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Header counts for the whole library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryStats {
    pub series: usize,
    pub episodes: usize,
    pub movies: usize,
}

impl LibraryStats {
    pub fn of(catalog: &Catalog) -> Self {
        Self {
            series: catalog.series.len(),
            episodes: catalog.episode_count(),
            movies: catalog.movies.len(),
        }
    }
}

impl fmt::Display for LibraryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Series • {} Episodes • {} Movies",
            self.series, self.episodes, self.movies
        )
    }
}

/// Human-readable size in base-1024 units, at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".into();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}
