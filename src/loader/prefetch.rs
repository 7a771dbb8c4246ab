//! # Prefetcher
//!
//! Warms a route's module ahead of navigation (link hover/focus). Each path
//! is requested at most once while its load is in flight or has succeeded.
//! A failed prefetch forgets the path again so a later hover or the real
//! navigation can retry. Failures are only ever logged.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::core::path::normalize;
use crate::routes::RouteTable;

pub struct Prefetcher {
    table: Arc<RouteTable>,
    requested: Mutex<HashSet<String>>,
}

impl Prefetcher {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            requested: Mutex::new(HashSet::new()),
        }
    }

    fn requested(&self) -> MutexGuard<'_, HashSet<String>> {
        self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_requested(&self, path: &str) -> bool {
        self.requested().contains(&normalize(path))
    }

    /// Loads the module `path` will render. Resolves once the load settles;
    /// never reports an error.
    pub async fn prefetch(&self, path: &str) {
        let path = normalize(path);
        if self.table.get(&path).is_none() {
            debug!("Nothing to prefetch for unknown route {}", path);
            return;
        }
        if !self.requested().insert(path.clone()) {
            return;
        }

        let load = self.table.effective_loader(&path);
        match load().await {
            Ok(_) => debug!("Prefetched {}", path),
            Err(e) => {
                debug!("Prefetch of {} failed, will retry on next request: {}", path, e);
                self.requested().remove(&path);
            }
        }
    }

    /// Fire-and-forget variant of [`prefetch`](Self::prefetch) on the tokio runtime.
    pub fn spawn(self: &Arc<Self>, path: &str) -> tokio::task::JoinHandle<()> {
        let prefetcher = Arc::clone(self);
        let path = path.to_string();
        tokio::spawn(async move { prefetcher.prefetch(&path).await })
    }
}
