//! # Resilient Module Loader
//!
//! Wraps any [`Loader`] with one recovery policy:
//!
//! ```text
//!            ┌──────── loader() vs timeout ────────┐
//!            ▼                                      ▼
//!        Success                                 Failure
//!   clear marker, return              ┌──────────────┼─────────────────┐
//!                                not transient   transient,       transient,
//!                                  re-throw      marker set       marker unset
//!                                                re-throw      set marker, reload
//!                                                              with `_r=<ts>`,
//!                                                                 re-throw
//! ```
//!
//! Static deployments can replace chunk files while a tab still points at
//! the old hashes. One full reload picks up the new chunk map. The marker
//! keeps that to a single attempt until some import succeeds again.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, warn};

use super::{LoadError, Loader, Module, ReloadMarker, loader};
use crate::platform::{HistoryPort, Location, Reloader, SessionStorage};

/// How long a single load may take before it counts as a transient failure.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(8000);

/// Query parameter carrying the cache-busting timestamp on a forced reload.
pub const RELOAD_PARAM: &str = "_r";

#[derive(Clone)]
pub struct ResilientLoader {
    marker: ReloadMarker,
    history: Arc<dyn HistoryPort>,
    reloader: Arc<dyn Reloader>,
    timeout: Duration,
}

impl ResilientLoader {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        history: Arc<dyn HistoryPort>,
        reloader: Arc<dyn Reloader>,
    ) -> Self {
        Self {
            marker: ReloadMarker::new(storage),
            history,
            reloader,
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `load` under the recovery policy.
    pub async fn load(&self, load: &Loader) -> Result<Module, LoadError> {
        let outcome = match tokio::time::timeout(self.timeout, load()).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(module) => {
                self.marker.clear();
                Ok(module)
            }
            Err(e) => Err(self.recover(e)),
        }
    }

    /// Returns a loader that applies this policy every time it is called.
    pub fn wrap(&self, load: Loader) -> Loader {
        let policy = self.clone();
        loader(move || {
            let policy = policy.clone();
            let load = load.clone();
            async move { policy.load(&load).await }
        })
    }

    /// Decides what a failure means. Always hands the error back; if a reload
    /// was requested it supersedes the page before anyone sees the error.
    fn recover(&self, err: LoadError) -> LoadError {
        if !err.is_transient() {
            debug!("Module load failed, not recoverable by reload: {}", err);
            return err;
        }
        if self.marker.is_set() {
            error!("Module load failed again after a reload attempt: {}", err);
            return err;
        }

        self.marker.set();
        let url = cache_busted_url(&self.history.location(), Utc::now().timestamp_millis());
        warn!("Transient module load failure ({}), reloading {}", err, url);
        self.reloader.reload(&url);
        err
    }
}

/// The current URL with `_r=<timestamp>` appended, replacing any earlier
/// `_r` so repeated episodes don't stack parameters.
fn cache_busted_url(location: &Location, timestamp: i64) -> String {
    let prefix = format!("{RELOAD_PARAM}=");
    let query = location.search.strip_prefix('?').unwrap_or(&location.search);
    let mut params: Vec<String> = query
        .split('&')
        .filter(|param| !param.is_empty() && !param.starts_with(&prefix))
        .map(str::to_string)
        .collect();
    params.push(format!("{prefix}{timestamp}"));
    format!("{}?{}", location.pathname, params.join("&"))
}
