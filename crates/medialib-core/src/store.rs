//! In-memory library store.
//!
//! Holds the last catalog fetched from the backend as an immutable
//! [`Arc<Catalog>`] snapshot. A refresh replaces the whole snapshot or
//! nothing. Refreshes are fenced by a monotonic ticket so that a slow,
//! older response can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::{Catalog, MediaItem};

/// Issued when a refresh starts; presented again to install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Debug)]
struct StoreState {
    catalog: Arc<Catalog>,
    applied: u64,
}

#[derive(Debug)]
pub struct LibraryStore {
    state: RwLock<StoreState>,
    issued: AtomicU64,
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::with_catalog(Catalog::default())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            state: RwLock::new(StoreState {
                catalog: Arc::new(catalog),
                applied: 0,
            }),
            issued: AtomicU64::new(0),
        }
    }

    /// Start a refresh. Tickets are strictly increasing.
    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Install a fetched catalog.
    ///
    /// Returns `false` (and leaves the store untouched) when a newer ticket
    /// has already been applied.
    pub fn apply(&self, ticket: RefreshTicket, catalog: Catalog) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 <= state.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = state.applied,
                "Discarding stale library response"
            );
            return false;
        }
        state.catalog = Arc::new(catalog);
        state.applied = ticket.0;
        true
    }

    /// The current catalog. Later refreshes never mutate a returned snapshot.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .catalog
            .clone()
    }

    /// Resolve `path` against the current snapshot.
    pub fn find_by_path(&self, path: &str) -> Option<MediaItem> {
        self.snapshot().find_by_path(path).cloned()
    }
}
