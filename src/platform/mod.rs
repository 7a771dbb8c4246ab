//! # Platform Services
//!
//! The navigation core never touches a browser directly. Everything it needs
//! from the host goes through the three ports below:
//!
//! ```text
//!   NavigationStore ──► HistoryPort      (location, push, scroll)
//!   ReloadMarker    ──► SessionStorage   (tab-scoped key/value)
//!   ResilientLoader ──► Reloader         (full page reload)
//! ```
//!
//! A web adapter implements these on top of `window.history`,
//! `sessionStorage` and `location`. The [`memory`] adapters back the tests
//! and the CLI.

pub mod memory;

use std::fmt;

pub use memory::{MemoryHistory, MemoryStorage, RecordingReloader};

/// A location as the host reports it: raw pathname plus raw search string
/// (including its leading `?`, or empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }

    /// Splits a URL-ish string (`/path?query`) on its first `?`.
    /// Anything from a `#` onwards is dropped, and a bare `?` counts as no
    /// query at all.
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        match url.find('?') {
            Some(idx) if idx + 1 < url.len() => Self::new(&url[..idx], &url[idx..]),
            Some(idx) => Self::new(&url[..idx], ""),
            None => Self::new(url, ""),
        }
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }
}

/// Errors a session storage backend can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Storage is disabled or inaccessible (private mode, sandboxed frame).
    Unavailable(String),
    /// The backend refused the write.
    QuotaExceeded,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            StorageError::QuotaExceeded => write!(f, "storage quota exceeded"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Browser history as seen by the navigation store.
pub trait HistoryPort: Send + Sync {
    /// The location the host is currently showing.
    fn location(&self) -> Location;

    /// Pushes a new entry without loading a new document.
    fn push_state(&self, url: &str);

    /// Resets the viewport to the top-left corner.
    fn scroll_to_top(&self);
}

/// Tab-scoped key/value storage.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Performs a full document reload of the given URL.
pub trait Reloader: Send + Sync {
    fn reload(&self, url: &str);
}
