//! The tab-scoped "a reload was already attempted" flag.
//!
//! Storage failures never escape from here. A marker that cannot be read
//! counts as unset, so a broken storage backend degrades to "always attempt
//! a reload" instead of crashing the page.

use std::sync::Arc;

use log::warn;

use crate::platform::SessionStorage;

/// Session storage key of the reload marker.
pub const RELOAD_MARKER_KEY: &str = "wayfinder:chunk-reload-attempted";

const MARKER_SET: &str = "1";

#[derive(Clone)]
pub struct ReloadMarker {
    storage: Arc<dyn SessionStorage>,
}

impl ReloadMarker {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Only the exact value `"1"` counts as set.
    pub fn is_set(&self) -> bool {
        match self.storage.get(RELOAD_MARKER_KEY) {
            Ok(value) => value.as_deref() == Some(MARKER_SET),
            Err(e) => {
                warn!("Could not read reload marker, treating as unset: {}", e);
                false
            }
        }
    }

    pub fn set(&self) {
        if let Err(e) = self.storage.set(RELOAD_MARKER_KEY, MARKER_SET) {
            warn!("Could not persist reload marker: {}", e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(RELOAD_MARKER_KEY) {
            warn!("Could not clear reload marker: {}", e);
        }
    }
}
