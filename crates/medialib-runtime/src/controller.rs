//! Playback controller and action relay.
//!
//! One [`Controller`] owns every piece of client state: the library store,
//! the playback session, the targeted item and the player mode. It is
//! driven from a single task, so none of it needs locking.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use medialib_api::types::{CoverKind, NextEpisode, PlayerState, ProgressUpdate};
use medialib_api::{ApiError, LibraryBackend};
use medialib_core::config::PlaybackConfig;
use medialib_core::models::MediaItem;
use medialib_core::store::LibraryStore;
use medialib_player::EmbeddedPlayer;

use crate::notify::{Notifier, ToastKind};

/// Timing and fallback values for playback tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub poll_interval: Duration,
    pub next_episode_delay: Duration,
    /// Position sent when marking an item of unknown length as watched.
    pub fallback_duration: f64,
}

impl PlaybackSettings {
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            next_episode_delay: config.next_episode_delay(),
            fallback_duration: config.fallback_duration_secs,
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            next_episode_delay: Duration::from_secs(2),
            fallback_duration: 3600.0,
        }
    }
}

/// How play requests are carried out. Chosen once at startup.
pub enum PlayerMode {
    /// A local player owns playback; no status polling.
    Embedded(Box<dyn EmbeddedPlayer>),
    /// The backend launches its player; we poll `/vlc/status`.
    External,
}

impl PlayerMode {
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl fmt::Debug for PlayerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(player) => f.debug_tuple("Embedded").field(&player.name()).finish(),
            Self::External => f.write_str("External"),
        }
    }
}

/// What is currently playing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSession {
    active_path: Option<String>,
}

impl PlaybackSession {
    pub fn active_path(&self) -> Option<&str> {
        self.active_path.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.active_path.is_some()
    }

    fn start(&mut self, path: &str) {
        self.active_path = Some(path.to_string());
    }

    fn finish(&mut self) -> Option<String> {
        self.active_path.take()
    }
}

/// Result of one status poll.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Nothing is playing, the player was not queried.
    Idle,
    /// The player isn't running or reported a state we don't track.
    Unreachable,
    /// Playing or paused without a usable position yet.
    Waiting,
    /// A silent progress update was sent.
    Progress { position: f64, duration: f64 },
    /// Playback stopped. `next` is the successor episode that was started.
    Finished { next: Option<String> },
}

pub struct Controller<B, N> {
    backend: B,
    notifier: N,
    player: PlayerMode,
    settings: PlaybackSettings,
    store: LibraryStore,
    session: PlaybackSession,
    target: Option<String>,
}

impl<B: LibraryBackend, N: Notifier> Controller<B, N> {
    pub fn new(backend: B, player: PlayerMode, notifier: N, settings: PlaybackSettings) -> Self {
        Self {
            backend,
            notifier,
            player,
            settings,
            store: LibraryStore::new(),
            session: PlaybackSession::default(),
            target: None,
        }
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn player_mode(&self) -> &PlayerMode {
        &self.player
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// Item the next `reset_progress` / `mark_watched` acts on.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    // ── Library ─────────────────────────────────────────────────

    /// Fetch the catalog and replace the store. Returns whether a new
    /// catalog was installed; on failure the store is left as it was.
    pub async fn refresh_library(&self) -> bool {
        let ticket = self.store.begin_refresh();
        match self.backend.fetch_library().await {
            Ok(catalog) => self.store.apply(ticket, catalog),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load library");
                self.notifier.alert("Failed to load media library");
                false
            }
        }
    }

    // ── Playback ────────────────────────────────────────────────

    /// Start playing `path`, resuming from its stored position.
    pub async fn play(&mut self, path: &str) -> bool {
        let item = self.store.find_by_path(path);
        let start_time = item.as_ref().map_or(0.0, |i| i.current_time);
        let name = item
            .as_ref()
            .map_or_else(|| "Unknown".to_string(), |i| i.name.clone());
        tracing::info!(path, start_time, found = item.is_some(), "Play requested");

        match &self.player {
            PlayerMode::Embedded(player) => {
                self.session.start(path);
                self.notifier
                    .toast(ToastKind::Info, &format!("Playing: {name}"));
                if let Err(e) = player.play_media(path, start_time) {
                    self.session.finish();
                    tracing::error!(path, error = %e, "Embedded player failed");
                    self.notifier
                        .alert(&format!("Failed to play media: {e}"));
                    return false;
                }
                true
            }
            PlayerMode::External => match self.backend.start_playback(path, start_time).await {
                Ok(()) => {
                    self.session.start(path);
                    self.notifier
                        .toast(ToastKind::Info, &format!("Playing: {name}"));
                    true
                }
                Err(e) => {
                    tracing::error!(path, error = %e, "Error playing media");
                    self.notifier
                        .alert(&format!("Failed to play media: {}", e.user_message()));
                    false
                }
            },
        }
    }

    /// Query the external player once and reconcile stored progress.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(path) = self.session.active_path().map(str::to_owned) else {
            return PollOutcome::Idle;
        };

        let status = match self.backend.player_status().await {
            Ok(Some(status)) => status,
            Ok(None) => return PollOutcome::Unreachable,
            Err(e) => {
                tracing::debug!(error = %e, "Player status unavailable");
                return PollOutcome::Unreachable;
            }
        };

        match status.state {
            PlayerState::Playing | PlayerState::Paused => {
                if status.time > 0.0 && status.length > 0.0 {
                    let update = ProgressUpdate {
                        path,
                        position: status.time,
                        duration: status.length,
                        completed: false,
                    };
                    self.update_progress(&update).await;
                    PollOutcome::Progress {
                        position: update.position,
                        duration: update.duration,
                    }
                } else {
                    PollOutcome::Waiting
                }
            }
            PlayerState::Stopped => {
                self.session.finish();
                let next = self.finish_playback(&path).await;
                PollOutcome::Finished { next }
            }
            PlayerState::Unknown => PollOutcome::Unreachable,
        }
    }

    async fn finish_playback(&mut self, path: &str) -> Option<String> {
        let Some(item) = self.store.find_by_path(path) else {
            tracing::warn!(path, "Finished item is no longer in the library");
            return None;
        };
        tracing::info!(path, "Playback finished");

        let update = ProgressUpdate {
            path: path.to_string(),
            position: 0.0,
            duration: item.duration,
            completed: true,
        };
        self.update_progress(&update).await;

        if item.episode_identity().is_some() {
            self.play_next_episode(path).await
        } else {
            None
        }
    }

    /// Poll the external player forever on the configured interval.
    ///
    /// Returns immediately in embedded mode, where the player tracks itself.
    pub async fn run_monitor(&mut self) {
        if self.player.is_embedded() {
            tracing::info!("Embedded player mode: external player monitoring disabled");
            return;
        }

        let mut ticker = self.poll_ticker();
        loop {
            ticker.tick().await;
            let outcome = self.poll_once().await;
            tracing::trace!(?outcome, "Player poll");
        }
    }

    /// Like [`run_monitor`](Self::run_monitor), but returns once nothing is
    /// playing. An auto-played successor keeps the session going.
    pub async fn follow_playback(&mut self) {
        if self.player.is_embedded() {
            return;
        }

        let mut ticker = self.poll_ticker();
        while self.session.is_playing() {
            ticker.tick().await;
            let outcome = self.poll_once().await;
            tracing::trace!(?outcome, "Player poll");
        }
    }

    /// First tick one full period from now, not immediately.
    fn poll_ticker(&self) -> time::Interval {
        let period = self.settings.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }

    /// Send a progress update. Completed updates also refresh the library;
    /// in-progress ones never do.
    pub async fn update_progress(&self, update: &ProgressUpdate) {
        if let Err(e) = self.backend.update_progress(update).await {
            tracing::error!(path = %update.path, error = %e, "Error updating progress");
        }
        if update.completed {
            self.refresh_library().await;
        }
    }

    /// Start the episode after `path`, if any, after the configured delay.
    pub async fn play_next_episode(&mut self, path: &str) -> Option<String> {
        let next = match self.backend.next_episode(path).await {
            Ok(Some(next)) => next,
            Ok(None) => {
                tracing::debug!(path, "No next episode");
                return None;
            }
            Err(e) => {
                tracing::error!(path, error = %e, "Error looking up next episode");
                return None;
            }
        };

        self.notifier.toast(
            ToastKind::Info,
            &format!("Auto-playing next episode: {}", next.name),
        );
        time::sleep(self.settings.next_episode_delay).await;
        self.play(&next.path).await;
        Some(next.path)
    }

    // ── Actions ─────────────────────────────────────────────────

    /// Flip the watched flag of `path`. The library is refreshed afterwards
    /// whether or not the server accepted the change.
    pub async fn toggle_watched(&self, path: &str) {
        let Some(item) = self.store.find_by_path(path) else {
            tracing::warn!(path, "Toggle watched: item not found");
            return;
        };

        let completed = !item.completed;
        let update = self.watched_update(path, Some(&item), completed);
        match self.backend.update_progress(&update).await {
            Ok(()) => {
                let message = if completed {
                    "Marked as watched"
                } else {
                    "Marked as unwatched"
                };
                self.notifier.toast(ToastKind::Success, message);
            }
            Err(e) => {
                tracing::error!(path, error = %e, "Error toggling watched status");
                self.notifier
                    .toast(ToastKind::Error, "Failed to update watch status");
            }
        }
        self.refresh_library().await;
    }

    /// Pick the item that `reset_progress` / `mark_watched` act on.
    pub fn select_target(&mut self, path: impl Into<String>) {
        self.target = Some(path.into());
    }

    /// Forget stored progress for the targeted item.
    pub async fn reset_progress(&mut self) -> bool {
        let Some(path) = self.target.take() else {
            return false;
        };

        match self.backend.reset_progress(&path).await {
            Ok(()) => {
                self.notifier.toast(ToastKind::Success, "Progress reset");
                self.refresh_library().await;
                true
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Error resetting progress");
                self.notifier
                    .toast(ToastKind::Error, "Failed to reset progress");
                false
            }
        }
    }

    /// Mark the targeted item as fully watched.
    pub async fn mark_watched(&mut self) -> bool {
        let Some(path) = self.target.take() else {
            return false;
        };

        let item = self.store.find_by_path(&path);
        let update = self.watched_update(&path, item.as_ref(), true);
        match self.backend.update_progress(&update).await {
            Ok(()) => {
                self.notifier.toast(ToastKind::Success, "Marked as watched");
                self.refresh_library().await;
                true
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "Error marking as watched");
                self.notifier
                    .toast(ToastKind::Error, "Failed to mark as watched");
                false
            }
        }
    }

    /// Watched: position at the end (or the fallback length). Unwatched:
    /// position zero. The real duration is sent either way.
    fn watched_update(&self, path: &str, item: Option<&MediaItem>, completed: bool) -> ProgressUpdate {
        let position = if completed {
            item.and_then(MediaItem::known_duration)
                .unwrap_or(self.settings.fallback_duration)
        } else {
            0.0
        };
        ProgressUpdate {
            path: path.to_string(),
            position,
            duration: item.map_or(0.0, |i| i.duration),
            completed,
        }
    }

    // ── Lookups ─────────────────────────────────────────────────

    pub async fn next_episode(&self, path: &str) -> Result<Option<NextEpisode>, ApiError> {
        self.backend.next_episode(path).await
    }

    pub async fn cover(&self, title: &str, kind: CoverKind) -> Result<Option<String>, ApiError> {
        self.backend.cover(title, kind).await
    }

    pub async fn set_cover(
        &self,
        title: &str,
        kind: CoverKind,
        cover_url: &str,
    ) -> Result<(), ApiError> {
        self.backend.set_cover(title, kind, cover_url).await?;
        tracing::info!(title, kind = kind.as_str(), "Cover updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use medialib_api::types::PlayerStatus;
    use medialib_core::models::Catalog;
    use medialib_player::PlayerError;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        FetchLibrary,
        StartPlayback { path: String, start_time: f64 },
        PlayerStatus,
        Progress(ProgressUpdate),
        NextEpisode(String),
        Reset(String),
    }

    /// In-memory server: applies progress to its catalog like the real one.
    #[derive(Default)]
    struct FakeBackend {
        catalog: Mutex<Catalog>,
        calls: Mutex<Vec<Call>>,
        statuses: Mutex<VecDeque<Option<PlayerStatus>>>,
        successors: HashMap<String, NextEpisode>,
        play_failure: Option<(u16, String)>,
        fail_progress: bool,
        fail_library: bool,
    }

    impl FakeBackend {
        fn with_catalog(catalog: Catalog) -> Self {
            Self {
                catalog: Mutex::new(catalog),
                ..Default::default()
            }
        }

        fn script(&self, statuses: Vec<Option<PlayerStatus>>) {
            self.statuses.lock().unwrap().extend(statuses);
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|c| pred(c)).count()
        }

        fn progress_updates(&self) -> Vec<ProgressUpdate> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Progress(u) => Some(u),
                    _ => None,
                })
                .collect()
        }
    }

    fn find_mut<'a>(catalog: &'a mut Catalog, path: &str) -> Option<&'a mut MediaItem> {
        for seasons in catalog.series.values_mut() {
            for episodes in seasons.values_mut() {
                if let Some(ep) = episodes.iter_mut().find(|ep| ep.path == path) {
                    return Some(ep);
                }
            }
        }
        catalog.movies.iter_mut().find(|m| m.path == path)
    }

    fn api_error(status: u16, message: &str) -> ApiError {
        ApiError::Api {
            status,
            message: message.into(),
        }
    }

    impl LibraryBackend for FakeBackend {
        async fn fetch_library(&self) -> Result<Catalog, ApiError> {
            self.record(Call::FetchLibrary);
            if self.fail_library {
                return Err(api_error(500, "scan failed"));
            }
            Ok(self.catalog.lock().unwrap().clone())
        }

        async fn start_playback(&self, path: &str, start_time: f64) -> Result<(), ApiError> {
            self.record(Call::StartPlayback {
                path: path.into(),
                start_time,
            });
            match &self.play_failure {
                Some((status, message)) => Err(api_error(*status, message)),
                None => Ok(()),
            }
        }

        async fn player_status(&self) -> Result<Option<PlayerStatus>, ApiError> {
            self.record(Call::PlayerStatus);
            Ok(self.statuses.lock().unwrap().pop_front().flatten())
        }

        async fn update_progress(&self, update: &ProgressUpdate) -> Result<(), ApiError> {
            self.record(Call::Progress(update.clone()));
            if self.fail_progress {
                return Err(api_error(500, "disk full"));
            }
            let mut catalog = self.catalog.lock().unwrap();
            if let Some(item) = find_mut(&mut catalog, &update.path) {
                item.current_time = update.position;
                item.duration = update.duration;
                item.completed = update.completed;
            }
            Ok(())
        }

        async fn next_episode(&self, path: &str) -> Result<Option<NextEpisode>, ApiError> {
            self.record(Call::NextEpisode(path.into()));
            Ok(self.successors.get(path).cloned())
        }

        async fn reset_progress(&self, path: &str) -> Result<(), ApiError> {
            self.record(Call::Reset(path.into()));
            let mut catalog = self.catalog.lock().unwrap();
            if let Some(item) = find_mut(&mut catalog, path) {
                item.current_time = 0.0;
                item.duration = 0.0;
                item.completed = false;
            }
            Ok(())
        }

        async fn cover(&self, _title: &str, _kind: CoverKind) -> Result<Option<String>, ApiError> {
            Ok(None)
        }

        async fn set_cover(
            &self,
            _title: &str,
            _kind: CoverKind,
            _cover_url: &str,
        ) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Toast(ToastKind, String),
        Alert(String),
    }

    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<Shown>>,
    }

    impl RecordingNotifier {
        fn shown(&self) -> Vec<Shown> {
            self.shown.lock().unwrap().clone()
        }

        fn alerts(&self) -> Vec<String> {
            self.shown()
                .into_iter()
                .filter_map(|s| match s {
                    Shown::Alert(m) => Some(m),
                    _ => None,
                })
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn toast(&self, kind: ToastKind, message: &str) {
            self.shown
                .lock()
                .unwrap()
                .push(Shown::Toast(kind, message.into()));
        }

        fn alert(&self, message: &str) {
            self.shown.lock().unwrap().push(Shown::Alert(message.into()));
        }
    }

    struct FakePlayer {
        launches: Arc<Mutex<Vec<(String, f64)>>>,
        fail: bool,
    }

    impl EmbeddedPlayer for FakePlayer {
        fn name(&self) -> &str {
            "fake"
        }

        fn play_media(&self, path: &str, start_time: f64) -> Result<(), PlayerError> {
            if self.fail {
                return Err(PlayerError::NotInstalled("fake".into()));
            }
            self.launches
                .lock()
                .unwrap()
                .push((path.to_string(), start_time));
            Ok(())
        }
    }

    const EP1: &str = "/tv/dark/s1e1.mkv";
    const EP2: &str = "/tv/dark/s1e2.mkv";
    const MOVIE: &str = "/movies/heat.mkv";

    fn library() -> Catalog {
        let ep = |path: &str, number: u32| MediaItem {
            season: Some(1),
            episode: Some(number),
            duration: 3000.0,
            ..MediaItem::new(path, format!("Episode {number}"))
        };
        let mut first = ep(EP1, 1);
        first.current_time = 120.0;

        let mut catalog = Catalog::default();
        catalog
            .series
            .entry("Dark".into())
            .or_default()
            .insert(1, vec![first, ep(EP2, 2)]);
        catalog.movies.push(MediaItem {
            duration: 6000.0,
            ..MediaItem::new(MOVIE, "Heat")
        });
        catalog
    }

    fn status(state: PlayerState, time: f64, length: f64) -> Option<PlayerStatus> {
        Some(PlayerStatus {
            state,
            time,
            length,
        })
    }

    async fn controller(backend: FakeBackend) -> Controller<FakeBackend, RecordingNotifier> {
        let controller = Controller::new(
            backend,
            PlayerMode::External,
            RecordingNotifier::default(),
            PlaybackSettings::default(),
        );
        assert!(controller.refresh_library().await);
        controller
    }

    fn dark_backend() -> FakeBackend {
        let mut backend = FakeBackend::with_catalog(library());
        backend.successors.insert(
            EP1.into(),
            NextEpisode {
                path: EP2.into(),
                name: "Episode 2".into(),
            },
        );
        backend
    }

    #[tokio::test]
    async fn test_play_external_resumes_from_stored_position() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;

        assert!(c.play(EP1).await);
        assert_eq!(c.session().active_path(), Some(EP1));
        assert!(c.backend().calls().contains(&Call::StartPlayback {
            path: EP1.into(),
            start_time: 120.0,
        }));
        assert_eq!(
            c.notifier().shown(),
            vec![Shown::Toast(ToastKind::Info, "Playing: Episode 1".into())]
        );
    }

    #[tokio::test]
    async fn test_play_unknown_path_starts_at_zero() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;

        assert!(c.play("/elsewhere.mkv").await);
        assert!(c.backend().calls().contains(&Call::StartPlayback {
            path: "/elsewhere.mkv".into(),
            start_time: 0.0,
        }));
    }

    #[tokio::test]
    async fn test_play_failure_surfaces_server_error() {
        let backend = FakeBackend {
            play_failure: Some((500, "busy".into())),
            ..FakeBackend::with_catalog(library())
        };
        let mut c = controller(backend).await;

        assert!(!c.play(EP1).await);
        assert_eq!(c.session().active_path(), None);
        let alerts = c.notifier().alerts();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].contains("busy"), "{alerts:?}");
    }

    #[tokio::test]
    async fn test_play_embedded_bypasses_backend() {
        let launches = Arc::new(Mutex::new(Vec::new()));
        let player = FakePlayer {
            launches: launches.clone(),
            fail: false,
        };
        let mut c = Controller::new(
            FakeBackend::with_catalog(library()),
            PlayerMode::Embedded(Box::new(player)),
            RecordingNotifier::default(),
            PlaybackSettings::default(),
        );
        c.refresh_library().await;

        assert!(c.play(EP1).await);
        assert_eq!(*launches.lock().unwrap(), vec![(EP1.to_string(), 120.0)]);
        assert_eq!(c.session().active_path(), Some(EP1));

        // Monitoring is disabled entirely: returns at once, never polls.
        c.run_monitor().await;
        assert_eq!(
            c.backend()
                .count(|call| matches!(call, Call::StartPlayback { .. } | Call::PlayerStatus)),
            0
        );
    }

    #[tokio::test]
    async fn test_play_embedded_failure_clears_session() {
        let player = FakePlayer {
            launches: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        };
        let mut c = Controller::new(
            FakeBackend::with_catalog(library()),
            PlayerMode::Embedded(Box::new(player)),
            RecordingNotifier::default(),
            PlaybackSettings::default(),
        );

        assert!(!c.play(MOVIE).await);
        assert!(!c.session().is_playing());
        assert_eq!(c.notifier().alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_poll_idle_does_not_query_player() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;

        assert_eq!(c.poll_once().await, PollOutcome::Idle);
        assert_eq!(c.backend().count(|call| *call == Call::PlayerStatus), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_episode_status_sequence_completes_once_and_plays_next() {
        let mut c = controller(dark_backend()).await;
        c.backend().script(vec![
            status(PlayerState::Playing, 10.0, 3000.0),
            status(PlayerState::Playing, 50.0, 3000.0),
            status(PlayerState::Stopped, 0.0, 0.0),
        ]);
        c.play(EP1).await;

        assert!(matches!(c.poll_once().await, PollOutcome::Progress { position, .. } if position == 10.0));
        assert!(matches!(c.poll_once().await, PollOutcome::Progress { position, .. } if position == 50.0));
        assert_eq!(
            c.poll_once().await,
            PollOutcome::Finished {
                next: Some(EP2.into())
            }
        );

        let updates = c.backend().progress_updates();
        let completed: Vec<_> = updates.iter().filter(|u| u.completed).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].path, EP1);
        assert_eq!(completed[0].position, 0.0);
        assert_eq!(completed[0].duration, 3000.0);
        assert_eq!(updates.len(), 3);

        assert_eq!(
            c.backend()
                .count(|call| matches!(call, Call::NextEpisode(p) if p == EP1)),
            1
        );
        // The successor is now playing.
        assert_eq!(c.session().active_path(), Some(EP2));
        assert!(c.notifier().shown().contains(&Shown::Toast(
            ToastKind::Info,
            "Auto-playing next episode: Episode 2".into()
        )));
    }

    #[tokio::test]
    async fn test_silent_updates_do_not_refresh() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.backend().script(vec![status(PlayerState::Paused, 300.0, 6000.0)]);
        c.play(MOVIE).await;

        let fetches_before = c.backend().count(|call| *call == Call::FetchLibrary);
        c.poll_once().await;
        let fetches_after = c.backend().count(|call| *call == Call::FetchLibrary);

        assert_eq!(fetches_before, fetches_after);
        // The store lags behind the server until the next refresh.
        assert_eq!(c.store().find_by_path(MOVIE).unwrap().current_time, 0.0);
    }

    #[tokio::test]
    async fn test_stopped_movie_completes_without_next_lookup() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.backend().script(vec![status(PlayerState::Stopped, 0.0, 0.0)]);
        c.play(MOVIE).await;

        assert_eq!(c.poll_once().await, PollOutcome::Finished { next: None });
        assert!(!c.session().is_playing());
        assert_eq!(
            c.backend()
                .count(|call| matches!(call, Call::NextEpisode(_))),
            0
        );
        // Completion refreshed the store.
        assert!(c.store().find_by_path(MOVIE).unwrap().completed);
    }

    #[tokio::test]
    async fn test_last_episode_has_no_successor() {
        let mut c = controller(dark_backend()).await;
        c.backend().script(vec![status(PlayerState::Stopped, 0.0, 0.0)]);
        c.play(EP2).await;

        assert_eq!(c.poll_once().await, PollOutcome::Finished { next: None });
        assert_eq!(
            c.backend()
                .count(|call| matches!(call, Call::NextEpisode(p) if p == EP2)),
            1
        );
        assert!(!c.session().is_playing());
    }

    #[tokio::test]
    async fn test_unreachable_player_is_not_an_error() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.backend().script(vec![None, status(PlayerState::Unknown, 5.0, 10.0)]);
        c.play(MOVIE).await;

        assert_eq!(c.poll_once().await, PollOutcome::Unreachable);
        assert_eq!(c.poll_once().await, PollOutcome::Unreachable);
        assert_eq!(c.session().active_path(), Some(MOVIE));
        assert!(c.backend().progress_updates().is_empty());
        assert!(c.notifier().alerts().is_empty());
    }

    #[tokio::test]
    async fn test_playing_without_length_waits() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.backend().script(vec![status(PlayerState::Playing, 12.0, 0.0)]);
        c.play(MOVIE).await;

        assert_eq!(c.poll_once().await, PollOutcome::Waiting);
        assert!(c.backend().progress_updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_polls_on_interval() {
        let mut c = controller(dark_backend()).await;
        c.backend().script(vec![
            status(PlayerState::Playing, 10.0, 3000.0),
            status(PlayerState::Playing, 50.0, 3000.0),
            status(PlayerState::Stopped, 0.0, 0.0),
        ]);
        c.play(EP1).await;

        // Ticks at 30s, 60s and 90s; the successor starts at 92s.
        let monitor = time::timeout(Duration::from_secs(95), c.run_monitor()).await;
        assert!(monitor.is_err());

        assert_eq!(c.backend().count(|call| *call == Call::PlayerStatus), 3);
        assert_eq!(
            c.backend()
                .progress_updates()
                .iter()
                .filter(|u| u.completed)
                .count(),
            1
        );
        assert_eq!(c.session().active_path(), Some(EP2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_playback_returns_after_last_episode() {
        let mut c = controller(dark_backend()).await;
        c.backend().script(vec![
            status(PlayerState::Playing, 900.0, 3000.0),
            status(PlayerState::Stopped, 0.0, 0.0),
            status(PlayerState::Stopped, 0.0, 0.0),
        ]);
        c.play(EP1).await;

        c.follow_playback().await;

        assert!(!c.session().is_playing());
        assert_eq!(c.backend().count(|call| *call == Call::PlayerStatus), 3);
        let completed: Vec<String> = c
            .backend()
            .progress_updates()
            .into_iter()
            .filter(|u| u.completed)
            .map(|u| u.path)
            .collect();
        assert_eq!(completed, vec![EP1.to_string(), EP2.to_string()]);
    }

    #[tokio::test]
    async fn test_follow_playback_when_idle_returns_at_once() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.follow_playback().await;
        assert_eq!(c.backend().count(|call| *call == Call::PlayerStatus), 0);
    }

    #[tokio::test]
    async fn test_toggle_watched_round_trip() {
        let c = controller(FakeBackend::with_catalog(library())).await;

        c.toggle_watched(EP2).await;
        let watched = c.store().find_by_path(EP2).unwrap();
        assert!(watched.completed);
        assert_eq!(watched.current_time, 3000.0);

        c.toggle_watched(EP2).await;
        let unwatched = c.store().find_by_path(EP2).unwrap();
        assert!(!unwatched.completed);
        assert_eq!(unwatched.current_time, 0.0);
        assert_eq!(unwatched.duration, 3000.0);

        assert_eq!(
            c.notifier().shown(),
            vec![
                Shown::Toast(ToastKind::Success, "Marked as watched".into()),
                Shown::Toast(ToastKind::Success, "Marked as unwatched".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_duration_uses_fallback_position() {
        let mut catalog = library();
        catalog.movies.push(MediaItem::new("/movies/new.mkv", "New"));
        let c = controller(FakeBackend::with_catalog(catalog)).await;

        c.toggle_watched("/movies/new.mkv").await;
        let update = c.backend().progress_updates().pop().unwrap();
        assert_eq!(update.position, 3600.0);
        assert_eq!(update.duration, 0.0);
        assert!(update.completed);
    }

    #[tokio::test]
    async fn test_toggle_failure_still_refreshes() {
        let backend = FakeBackend {
            fail_progress: true,
            ..FakeBackend::with_catalog(library())
        };
        let c = controller(backend).await;
        let fetches = c.backend().count(|call| *call == Call::FetchLibrary);

        c.toggle_watched(MOVIE).await;

        assert_eq!(
            c.backend().count(|call| *call == Call::FetchLibrary),
            fetches + 1
        );
        assert_eq!(
            c.notifier().shown(),
            vec![Shown::Toast(
                ToastKind::Error,
                "Failed to update watch status".into()
            )]
        );
    }

    #[tokio::test]
    async fn test_toggle_unknown_path_does_nothing() {
        let c = controller(FakeBackend::with_catalog(library())).await;
        c.toggle_watched("/missing.mkv").await;
        assert!(c.backend().progress_updates().is_empty());
    }

    #[tokio::test]
    async fn test_reset_progress_needs_target() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        assert!(!c.reset_progress().await);
        assert_eq!(c.backend().count(|call| matches!(call, Call::Reset(_))), 0);

        c.select_target(EP1);
        assert_eq!(c.target(), Some(EP1));
        assert!(c.reset_progress().await);
        assert_eq!(c.target(), None);
        assert_eq!(c.store().find_by_path(EP1).unwrap().current_time, 0.0);
        assert!(c
            .notifier()
            .shown()
            .contains(&Shown::Toast(ToastKind::Success, "Progress reset".into())));
    }

    #[tokio::test]
    async fn test_mark_watched_target() {
        let mut c = controller(FakeBackend::with_catalog(library())).await;
        c.select_target(MOVIE);

        assert!(c.mark_watched().await);
        let update = c.backend().progress_updates().pop().unwrap();
        assert_eq!(update.position, 6000.0);
        assert_eq!(update.duration, 6000.0);
        assert!(c.store().find_by_path(MOVIE).unwrap().completed);
    }

    #[tokio::test]
    async fn test_mark_watched_failure_toasts() {
        let backend = FakeBackend {
            fail_progress: true,
            ..FakeBackend::with_catalog(library())
        };
        let mut c = controller(backend).await;
        c.select_target(MOVIE);

        assert!(!c.mark_watched().await);
        assert!(c.notifier().shown().contains(&Shown::Toast(
            ToastKind::Error,
            "Failed to mark as watched".into()
        )));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_store() {
        let backend = FakeBackend::with_catalog(library());
        let mut c = controller(backend).await;
        c.backend.fail_library = true;

        assert!(!c.refresh_library().await);
        assert!(c.store().find_by_path(MOVIE).is_some());
        assert_eq!(
            c.notifier().alerts(),
            vec!["Failed to load media library".to_string()]
        );
    }
}
