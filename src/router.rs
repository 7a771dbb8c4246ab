//! # Router
//!
//! Wires the pieces together the way a page shell uses them:
//!
//! ```text
//! NavigationStore ──path──► RouteTable ──effective loader──► ResilientLoader
//!                                │                                │
//!                                └──► Prefetcher            Module | LoadError
//!                                                                 │
//!                                                     PageView (page or error boundary)
//! ```

use std::sync::Arc;

use log::error;
use serde::Serialize;

use crate::core::config::ResolvedConfig;
use crate::core::{NavigationState, NavigationStore};
use crate::loader::{LoadError, Module, Prefetcher, ResilientLoader};
use crate::platform::{HistoryPort, Reloader, SessionStorage};
use crate::routes::{Resolution, RouteTable};

/// Host services the router runs on.
#[derive(Clone)]
pub struct Platform {
    pub history: Arc<dyn HistoryPort>,
    pub storage: Arc<dyn SessionStorage>,
    pub reloader: Arc<dyn Reloader>,
}

/// What the shell shows for the current location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PageView {
    Page {
        resolution: Resolution,
        content: String,
    },
    /// Error boundary: the load failed for good, offer a manual reload.
    Failed { message: String },
}

impl PageView {
    pub fn render(&self) -> String {
        match self {
            PageView::Page { content, .. } => content.clone(),
            PageView::Failed { message } => format!(
                "Something went wrong while loading this page ({message}). Reload to try again."
            ),
        }
    }
}

pub struct Router {
    store: NavigationStore,
    table: Arc<RouteTable>,
    loader: ResilientLoader,
    prefetcher: Arc<Prefetcher>,
}

impl Router {
    pub fn new(platform: Platform, table: RouteTable, config: &ResolvedConfig) -> Self {
        let table = Arc::new(table);
        let loader = ResilientLoader::new(
            platform.storage,
            platform.history.clone(),
            platform.reloader,
        )
        .with_timeout(config.load_timeout);
        Self {
            store: NavigationStore::new(platform.history),
            prefetcher: Arc::new(Prefetcher::new(table.clone())),
            table,
            loader,
        }
    }

    pub fn store(&self) -> &NavigationStore {
        &self.store
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn prefetcher(&self) -> &Arc<Prefetcher> {
        &self.prefetcher
    }

    pub fn current(&self) -> NavigationState {
        self.store.current()
    }

    pub fn navigate(&self, to: &str) {
        self.store.navigate(to);
    }

    /// Starts warming `path` in the background.
    pub fn prefetch(&self, path: &str) -> tokio::task::JoinHandle<()> {
        self.prefetcher.spawn(path)
    }

    /// Loads the module for the current path through the recovery policy.
    pub async fn load_current(&self) -> (Resolution, Result<Module, LoadError>) {
        let state = self.store.current();
        let (resolution, load) = self.table.resolve(&state.path);
        (resolution, self.loader.load(&load).await)
    }

    /// Loads and renders the current path. Failures end in the error boundary.
    pub async fn render_current(&self) -> PageView {
        match self.load_current().await {
            (resolution, Ok(module)) => PageView::Page {
                resolution,
                content: module.render(),
            },
            (_, Err(e)) => {
                error!("Page {} failed to load: {}", self.store.current().href(), e);
                PageView::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}
