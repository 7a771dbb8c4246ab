//! # Module Loading
//!
//! A page is loaded through a [`Loader`]: an async factory that yields a
//! [`Module`] exposing one default renderable unit. Loaders may be called
//! any number of times and concurrently (retries, prefetch, navigation).
//!
//! ```text
//! Loader ──► ResilientLoader (timeout, classify, one-shot reload) ──► UI
//!    │
//!    └────► Prefetcher (dedup, errors swallowed)
//! ```

pub mod marker;
pub mod prefetch;
pub mod resilient;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::OnceCell;

pub use marker::{RELOAD_MARKER_KEY, ReloadMarker};
pub use prefetch::Prefetcher;
pub use resilient::{DEFAULT_LOAD_TIMEOUT, RELOAD_PARAM, ResilientLoader};

/// A renderable unit. What "render" means belongs to the host UI; the core
/// only needs something it can hand over.
pub trait Render: Send + Sync {
    fn render(&self) -> String;
}

/// A loaded page module.
#[derive(Clone)]
pub struct Module {
    pub default: Arc<dyn Render>,
}

impl Module {
    pub fn new(page: impl Render + 'static) -> Self {
        Self {
            default: Arc::new(page),
        }
    }

    pub fn render(&self) -> String {
        self.default.render()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").finish_non_exhaustive()
    }
}

/// Async factory for a page module.
pub type Loader = Arc<dyn Fn() -> BoxFuture<'static, Result<Module, LoadError>> + Send + Sync>;

/// Wraps an async closure as a [`Loader`].
pub fn loader<F, Fut>(factory: F) -> Loader
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Module, LoadError>> + Send + 'static,
{
    Arc::new(move || factory().boxed())
}

/// Memoizes the first successful load of `inner`, the way a module system
/// keeps an evaluated chunk. Failures are not kept, so the next call retries.
/// Concurrent callers share one in-flight load.
pub fn cached(inner: Loader) -> Loader {
    let cell: Arc<OnceCell<Module>> = Arc::new(OnceCell::new());
    loader(move || {
        let cell = cell.clone();
        let inner = inner.clone();
        async move { cell.get_or_try_init(|| inner()).await.cloned() }
    })
}

/// Message prefix of the synthetic timeout error. Also one of the transient
/// signatures, so a timeout classifies like a failed chunk fetch.
const TIMEOUT_SIGNATURE: &str = "module load timed out";

/// Message fragments (lowercase) that mark a chunk fetch as transient.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "failed to fetch dynamically imported module",
    "error loading dynamically imported module",
    "importing a module script failed",
    "loading chunk",
    "chunkloaderror",
    TIMEOUT_SIGNATURE,
];

/// Errors surfaced while loading a page module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The loader did not settle within the configured timeout.
    Timeout(Duration),
    /// The loader itself failed. The message is what the module system reported.
    Module(String),
}

impl LoadError {
    pub fn module(message: impl Into<String>) -> Self {
        LoadError::Module(message.into())
    }

    /// True if the failure looks like a stale or flaky chunk fetch that a
    /// fresh page load is likely to fix.
    pub fn is_transient(&self) -> bool {
        let message = self.to_string().to_lowercase();
        TRANSIENT_SIGNATURES
            .iter()
            .any(|signature| message.contains(signature))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Timeout(after) => {
                write!(f, "Module load timed out after {}ms", after.as_millis())
            }
            LoadError::Module(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingLoader;

    #[test]
    fn test_chunk_errors_are_transient() {
        let messages = [
            "TypeError: Failed to fetch dynamically imported module: /assets/Grow-3f2a.js",
            "TypeError: error loading dynamically imported module",
            "TypeError: Importing a module script failed.",
            "Loading chunk 42 failed.",
            "ChunkLoadError: Loading chunk vendors failed",
        ];
        for message in messages {
            assert!(LoadError::module(message).is_transient(), "{message}");
        }
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = LoadError::Timeout(Duration::from_millis(8000));
        assert_eq!(err.to_string(), "Module load timed out after 8000ms");
        assert!(err.is_transient());
    }

    #[test]
    fn test_page_bugs_are_not_transient() {
        let err = LoadError::module("TypeError: cannot read properties of undefined");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_loader_helper_produces_module() {
        struct Hello;
        impl Render for Hello {
            fn render(&self) -> String {
                "hello".to_string()
            }
        }

        let load = loader(|| async { Ok(Module::new(Hello)) });
        let module = load().await.unwrap();
        assert_eq!(module.render(), "hello");
    }

    #[tokio::test]
    async fn test_cached_loader_keeps_success_only() {
        let failing = CountingLoader::failing("Loading chunk 4 failed.");
        let load = cached(failing.loader());
        assert!(load().await.is_err());
        assert!(load().await.is_err());
        assert_eq!(failing.calls(), 2);

        let counting = CountingLoader::ok("grow");
        let load = cached(counting.loader());
        let (a, b) = futures::join!(load(), load());
        assert_eq!(a.unwrap().render(), "grow");
        assert_eq!(b.unwrap().render(), "grow");
        assert_eq!(load().await.unwrap().render(), "grow");
        assert_eq!(counting.calls(), 1);
    }
}
