//! Plain-text rendering of library views.
//!
//! Every function returns a `String` so the output can be tested without a
//! terminal.

use std::fmt::Write;

use chrono::NaiveDateTime;

use medialib_core::models::{Catalog, MediaItem};
use medialib_core::view::{self, LibraryStats, SeriesView, ShelfEntry};

const BAR_WIDTH: usize = 20;

/// `[#####...............]` for a percentage in `0..=100`.
pub fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn played_at(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// One item: title line, then a progress line only if playback has started.
pub fn card(title: &str, item: &MediaItem) -> String {
    let mut out = format!("{title}  ({})", view::format_file_size(item.size));
    if item.completed {
        out.push_str("  [watched]");
    }
    if let Some(ts) = item.last_played {
        let _ = write!(out, "  last played {}", played_at(ts));
    }
    if item.has_progress() {
        let _ = write!(
            out,
            "\n    {} {}% watched",
            progress_bar(item.progress_percent()),
            item.display_percent()
        );
    }
    let _ = write!(out, "\n    {}", item.path);
    out
}

/// "Continue watching" shelf; empty string when nothing is in progress.
pub fn shelf(entries: &[ShelfEntry<'_>]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from("Continue watching\n");
    for entry in entries {
        let _ = writeln!(out, "  {}", indent(&card(&entry.display_name, entry.item)));
    }
    out
}

pub fn movies(items: &[MediaItem]) -> String {
    if items.is_empty() {
        return "No movies found\n".into();
    }
    let mut out = String::from("Movies\n");
    for movie in items {
        let _ = writeln!(out, "  {}", indent(&card(&movie.name, movie)));
    }
    out
}

/// Series listing. With `expand`, every season and episode is listed too.
pub fn series(listing: &[SeriesView<'_>], expand: bool) -> String {
    if listing.is_empty() {
        return "No TV series found\n".into();
    }
    let mut out = String::from("TV Series\n");
    for show in listing {
        let _ = writeln!(
            out,
            "  {}  {} season{} · {}/{} episodes watched",
            show.name,
            show.seasons.len(),
            if show.seasons.len() == 1 { "" } else { "s" },
            show.watched_episodes,
            show.total_episodes,
        );
        if !expand {
            continue;
        }
        for season in &show.seasons {
            let _ = writeln!(
                out,
                "    Season {}  {}/{}",
                season.number,
                season.watched,
                season.episodes.len()
            );
            for ep in season.episodes {
                let title = match ep.episode {
                    Some(number) => format!("E{number} {}", ep.name),
                    None => ep.name.clone(),
                };
                let _ = writeln!(out, "      {}", indent_by(&card(&title, ep), 6));
            }
        }
    }
    out
}

pub fn stats(catalog: &Catalog) -> String {
    LibraryStats::of(catalog).to_string()
}

/// Full library: stats line, shelf, series and movies.
pub fn library(catalog: &Catalog) -> String {
    let mut out = stats(catalog);
    out.push_str("\n\n");
    let shelf = shelf(&view::continue_watching(catalog));
    if !shelf.is_empty() {
        out.push_str(&shelf);
        out.push('\n');
    }
    out.push_str(&series(&view::series_listing(catalog), false));
    out.push('\n');
    out.push_str(&movies(view::movie_grid(catalog)));
    out
}

fn indent(text: &str) -> String {
    indent_by(text, 2)
}

fn indent_by(text: &str, width: usize) -> String {
    text.replace('\n', &format!("\n{}", " ".repeat(width)))
}
