//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::loader::{LoadError, Loader, Module, Render, loader};

/// A page that renders a fixed string.
pub struct StaticPage(pub String);

impl Render for StaticPage {
    fn render(&self) -> String {
        self.0.clone()
    }
}

/// Loader that always succeeds with a page rendering `name`.
pub fn page_loader(name: &str) -> Loader {
    let name = name.to_string();
    loader(move || {
        let name = name.clone();
        async move { Ok(Module::new(StaticPage(name))) }
    })
}

/// Loader that always fails with `message`.
pub fn always_failing(message: &str) -> Loader {
    let message = message.to_string();
    loader(move || {
        let message = message.clone();
        async move { Err(LoadError::Module(message)) }
    })
}

enum Behaviour {
    Succeed(String),
    Fail(String),
    Hang,
}

/// Loader that counts how often it is invoked. Every load yields to the
/// runtime once before settling, so concurrent callers really overlap.
#[derive(Clone)]
pub struct CountingLoader {
    calls: Arc<AtomicUsize>,
    behaviour: Arc<Behaviour>,
}

impl CountingLoader {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            behaviour: Arc::new(behaviour),
        }
    }

    pub fn ok(name: &str) -> Self {
        Self::with(Behaviour::Succeed(name.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Behaviour::Fail(message.to_string()))
    }

    pub fn hanging() -> Self {
        Self::with(Behaviour::Hang)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn loader(&self) -> Loader {
        let this = self.clone();
        loader(move || {
            this.calls.fetch_add(1, Ordering::SeqCst);
            let behaviour = this.behaviour.clone();
            async move {
                tokio::task::yield_now().await;
                match behaviour.as_ref() {
                    Behaviour::Succeed(name) => Ok(Module::new(StaticPage(name.clone()))),
                    Behaviour::Fail(message) => Err(LoadError::Module(message.clone())),
                    Behaviour::Hang => futures::future::pending().await,
                }
            }
        })
    }
}
