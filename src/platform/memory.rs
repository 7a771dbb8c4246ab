//! In-memory platform adapters.
//!
//! These behave like their browser counterparts closely enough for the core
//! to be driven without a browser: `MemoryHistory` keeps an entry stack with
//! a cursor, `MemoryStorage` is a plain map that can be switched off, and
//! `RecordingReloader` remembers every reload it was asked to perform.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{HistoryPort, Location, Reloader, SessionStorage, StorageError};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// History
// ============================================================================

struct HistoryStack {
    entries: Vec<Location>,
    cursor: usize,
}

/// Entry stack with browser semantics: pushing drops any forward entries.
pub struct MemoryHistory {
    stack: Mutex<HistoryStack>,
    scroll_resets: AtomicUsize,
}

impl MemoryHistory {
    /// Starts a history whose only entry is `initial_url`.
    pub fn new(initial_url: &str) -> Self {
        Self {
            stack: Mutex::new(HistoryStack {
                entries: vec![Location::parse(initial_url)],
                cursor: 0,
            }),
            scroll_resets: AtomicUsize::new(0),
        }
    }

    /// Number of entries in the stack, including the initial one.
    pub fn len(&self) -> usize {
        locked(&self.stack).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves the cursor one entry back. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let mut stack = locked(&self.stack);
        if stack.cursor == 0 {
            return false;
        }
        stack.cursor -= 1;
        true
    }

    /// Moves the cursor one entry forward. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let mut stack = locked(&self.stack);
        if stack.cursor + 1 >= stack.entries.len() {
            return false;
        }
        stack.cursor += 1;
        true
    }

    /// How many times the viewport was reset.
    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.load(Ordering::SeqCst)
    }
}

impl HistoryPort for MemoryHistory {
    fn location(&self) -> Location {
        let stack = locked(&self.stack);
        stack.entries[stack.cursor].clone()
    }

    fn push_state(&self, url: &str) {
        let mut stack = locked(&self.stack);
        let keep = stack.cursor + 1;
        stack.entries.truncate(keep);
        stack.entries.push(Location::parse(url));
        stack.cursor = keep;
    }

    fn scroll_to_top(&self) {
        self.scroll_resets.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Session storage
// ============================================================================

/// Map-backed session storage. `disable()` makes every call fail, which is
/// how private-mode or sandboxed browsers behave.
#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    disabled: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }

    pub fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage is disabled".to_string()));
        }
        Ok(())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(locked(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        locked(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        locked(&self.values).remove(key);
        Ok(())
    }
}

// ============================================================================
// Reload
// ============================================================================

/// Records reload requests instead of performing them.
#[derive(Default)]
pub struct RecordingReloader {
    urls: Mutex<Vec<String>>,
}

impl RecordingReloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        locked(&self.urls).len()
    }

    pub fn urls(&self) -> Vec<String> {
        locked(&self.urls).clone()
    }
}

impl Reloader for RecordingReloader {
    fn reload(&self, url: &str) {
        locked(&self.urls).push(url.to_string());
    }
}
