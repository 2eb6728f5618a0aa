//! The backend seam.
//!
//! [`BackendClient`](crate::BackendClient) talks HTTP; the playback
//! controller only sees this trait, so tests can substitute an in-memory
//! backend.

use std::future::Future;

use medialib_core::models::Catalog;

use crate::error::ApiError;
use crate::types::{CoverKind, NextEpisode, PlayerStatus, ProgressUpdate};

/// Operations the media library server offers.
pub trait LibraryBackend: Send + Sync {
    /// Fetch the whole catalog.
    fn fetch_library(&self) -> impl Future<Output = Result<Catalog, ApiError>> + Send;

    /// Ask the server to launch its external player at `start_time` seconds.
    fn start_playback(
        &self,
        path: &str,
        start_time: f64,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Current external player status, `None` when the player isn't reachable.
    fn player_status(&self) -> impl Future<Output = Result<Option<PlayerStatus>, ApiError>> + Send;

    /// Store a playback position (and completion flag) for an item.
    fn update_progress(
        &self,
        update: &ProgressUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Resolve the episode following `path`, `None` at the end of a series.
    fn next_episode(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Option<NextEpisode>, ApiError>> + Send;

    /// Forget all stored progress for an item.
    fn reset_progress(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Cached cover image URL for a title.
    fn cover(
        &self,
        title: &str,
        kind: CoverKind,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    /// Override the cover image URL for a title.
    fn set_cover(
        &self,
        title: &str,
        kind: CoverKind,
        cover_url: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
