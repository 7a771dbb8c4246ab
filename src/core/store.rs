//! # Navigation Store
//!
//! Single source of truth for the current `{path, search}`.
//!
//! Consumers never talk to the history API. They read [`NavigationStore::current`]
//! or hold a [`watch::Receiver`] from [`NavigationStore::subscribe`] and
//! re-render when it changes. State only moves through `navigate()` or a
//! back/forward event (`sync_from_location()`).

use std::sync::Arc;

use log::debug;
use tokio::sync::{mpsc, watch};

use crate::core::path::{self, NavigationState};
use crate::platform::HistoryPort;

/// Signal that the host moved through its history (back/forward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopState;

pub struct NavigationStore {
    history: Arc<dyn HistoryPort>,
    state: watch::Sender<NavigationState>,
}

impl NavigationStore {
    /// Builds the store from whatever location the host is showing right now.
    pub fn new(history: Arc<dyn HistoryPort>) -> Self {
        let initial = path::resolve(&history.location());
        debug!("Navigation store starting at {}", initial.href());
        let (state, _) = watch::channel(initial);
        Self { history, state }
    }

    pub fn current(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.state.subscribe()
    }

    /// Navigates to `to` (`/path?query`).
    ///
    /// Navigating to the exact current path and query does nothing. Scroll is
    /// reset only when the path changes, not for query-only changes.
    pub fn navigate(&self, to: &str) {
        let (raw_path, query) = match to.find('?') {
            Some(idx) => (&to[..idx], &to[idx..]),
            None => (to, ""),
        };
        // A bare `?` is an empty query, as `location.search` reports it.
        let query = if query == "?" { "" } else { query };
        let path = path::normalize(raw_path);

        let current = self.current();
        if path == current.path && query == current.search {
            debug!("Ignoring navigation to current location {}", current.href());
            return;
        }

        let next = NavigationState {
            path,
            search: query.to_string(),
        };
        let path_changed = next.path != current.path;

        self.history.push_state(&next.href());
        debug!("Navigated {} -> {}", current.href(), next.href());
        self.state.send_replace(next);

        if path_changed {
            self.history.scroll_to_top();
        }
    }

    /// Re-reads the host location after a back/forward move, exactly as on a
    /// fresh load of that URL.
    pub fn sync_from_location(&self) {
        let resolved = path::resolve(&self.history.location());
        self.state.send_if_modified(|state| {
            if *state == resolved {
                return false;
            }
            debug!("History moved to {}", resolved.href());
            *state = resolved;
            true
        });
    }

    /// Resynchronizes on every pop-state signal until the sender is dropped.
    pub async fn follow(&self, mut events: mpsc::UnboundedReceiver<PopState>) {
        while events.recv().await.is_some() {
            self.sync_from_location();
        }
        debug!("Pop-state channel closed");
    }
}
