//! # Route Table
//!
//! Static `path → loader` map plus the policy that decides whether a path
//! gets its genuine page or a substitute. First matching rule wins:
//!
//! 1. always-public paths        → genuine
//! 2. forced-hidden paths        → not found
//! 3. production + internal      → not found
//! 4. ready for general release  → genuine
//! 5. anything else in the table → coming soon
//!
//! Paths that are not in the table at all resolve to not found.

use std::collections::HashMap;
use std::fmt;

use log::info;
use serde::Serialize;

use crate::core::path::normalize;
use crate::loader::{Loader, cached};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    Ready,
    NotReady,
}

/// Which page a path ends up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    Genuine,
    ComingSoon,
    NotFound,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Genuine => write!(f, "genuine"),
            Resolution::ComingSoon => write!(f, "coming-soon"),
            Resolution::NotFound => write!(f, "not-found"),
        }
    }
}

#[derive(Clone)]
pub struct RouteEntry {
    pub path: String,
    pub loader: Loader,
    pub visibility: Visibility,
    pub availability: Availability,
}

/// Path sets and environment flag consulted by the resolution rules.
/// Entries in the sets match the path itself and everything below it.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityPolicy {
    pub production: bool,
    pub always_public: Vec<String>,
    pub forced_hidden: Vec<String>,
    pub ready: Vec<String>,
}

impl AvailabilityPolicy {
    fn is_ready(&self, path: &str) -> bool {
        self.ready.iter().any(|ready| normalize(ready) == path)
    }
}

fn covers(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| {
        let prefix = normalize(prefix);
        path == prefix || prefix == "/" || path.starts_with(&format!("{prefix}/"))
    })
}

/// Loaders for the two substitute pages.
#[derive(Clone)]
pub struct Fallbacks {
    pub coming_soon: Loader,
    pub not_found: Loader,
}

pub struct RouteTable {
    routes: HashMap<String, RouteEntry>,
    policy: AvailabilityPolicy,
    fallbacks: Fallbacks,
}

impl RouteTable {
    pub fn new(policy: AvailabilityPolicy, fallbacks: Fallbacks) -> Self {
        Self {
            routes: HashMap::new(),
            policy,
            fallbacks,
        }
    }

    /// Adds a route. Its availability comes from the policy's ready list.
    /// The loader is memoized, so a prefetched module is reused on navigation.
    pub fn with_route(mut self, path: &str, visibility: Visibility, loader: Loader) -> Self {
        let path = normalize(path);
        let availability = if self.policy.is_ready(&path) {
            Availability::Ready
        } else {
            Availability::NotReady
        };
        self.routes.insert(
            path.clone(),
            RouteEntry {
                path,
                loader: cached(loader),
                visibility,
                availability,
            },
        );
        self
    }

    pub fn policy(&self) -> &AvailabilityPolicy {
        &self.policy
    }

    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(&normalize(path))
    }

    /// All entries, sorted by path.
    pub fn entries(&self) -> Vec<&RouteEntry> {
        let mut entries: Vec<&RouteEntry> = self.routes.values().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    pub fn resolution(&self, path: &str) -> Resolution {
        let path = normalize(path);
        let Some(entry) = self.routes.get(&path) else {
            return Resolution::NotFound;
        };

        if covers(&self.policy.always_public, &path) {
            Resolution::Genuine
        } else if covers(&self.policy.forced_hidden, &path) {
            Resolution::NotFound
        } else if self.policy.production && entry.visibility == Visibility::Internal {
            Resolution::NotFound
        } else if entry.availability == Availability::Ready {
            Resolution::Genuine
        } else {
            Resolution::ComingSoon
        }
    }

    /// The loader `path` should actually use, with the reason.
    pub fn resolve(&self, path: &str) -> (Resolution, Loader) {
        let resolution = self.resolution(path);
        let loader = match resolution {
            Resolution::Genuine => match self.get(path) {
                Some(entry) => entry.loader.clone(),
                None => self.fallbacks.not_found.clone(),
            },
            Resolution::ComingSoon => self.fallbacks.coming_soon.clone(),
            Resolution::NotFound => self.fallbacks.not_found.clone(),
        };
        if resolution != Resolution::Genuine {
            info!("Route {} resolved to {}", normalize(path), resolution);
        }
        (resolution, loader)
    }

    pub fn effective_loader(&self, path: &str) -> Loader {
        self.resolve(path).1
    }
}
