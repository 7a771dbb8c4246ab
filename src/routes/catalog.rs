//! The application's fixed route table.
//!
//! Page modules themselves live outside the navigation core; here each one is
//! represented by a [`NamedPage`] so the table, the CLI and the tests have
//! something to load.

use log::debug;

use super::table::{AvailabilityPolicy, Fallbacks, RouteTable, Visibility};
use crate::core::config::ResolvedConfig;
use crate::loader::{Loader, Module, Render, loader};

/// Every route the application knows about.
pub const ROUTES: &[(&str, &str, Visibility)] = &[
    ("/", "Home", Visibility::Public),
    ("/grow", "Grow", Visibility::Public),
    ("/govern", "Govern", Visibility::Public),
    ("/govern/audit-detail", "Audit Detail", Visibility::Public),
    ("/build", "Build", Visibility::Public),
    ("/insights", "Insights", Visibility::Public),
    ("/docs", "Documentation", Visibility::Public),
    ("/docs/style-guide", "Style Guide", Visibility::Public),
    ("/internal/diagnostics", "Diagnostics", Visibility::Internal),
    ("/test/spectacular", "Spectacular Test Harness", Visibility::Internal),
];

/// Routes released to users.
pub const READY: &[&str] = &["/", "/grow", "/govern", "/govern/audit-detail"];

/// Reachable in every environment.
pub const ALWAYS_PUBLIC: &[&str] = &["/docs"];

/// Never reachable, whatever else is configured.
pub const FORCED_HIDDEN: &[&str] = &["/test/spectacular"];

/// Stand-in for a page module: renders its title.
pub struct NamedPage {
    pub title: &'static str,
}

impl Render for NamedPage {
    fn render(&self) -> String {
        self.title.to_string()
    }
}

pub struct ComingSoonPage;

impl Render for ComingSoonPage {
    fn render(&self) -> String {
        "Coming soon".to_string()
    }
}

pub struct NotFoundPage;

impl Render for NotFoundPage {
    fn render(&self) -> String {
        "Page not found".to_string()
    }
}

pub fn named_page(title: &'static str) -> Loader {
    loader(move || async move { Ok(Module::new(NamedPage { title })) })
}

pub fn fallbacks() -> Fallbacks {
    Fallbacks {
        coming_soon: loader(|| async { Ok(Module::new(ComingSoonPage)) }),
        not_found: loader(|| async { Ok(Module::new(NotFoundPage)) }),
    }
}

fn merged(builtin: &[&str], extra: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = builtin.iter().map(|p| p.to_string()).collect();
    for path in extra {
        if !paths.contains(path) {
            paths.push(path.clone());
        }
    }
    paths
}

/// The built-in lists with the configured additions.
pub fn policy(config: &ResolvedConfig) -> AvailabilityPolicy {
    AvailabilityPolicy {
        production: config.production,
        always_public: merged(ALWAYS_PUBLIC, &config.always_public),
        forced_hidden: merged(FORCED_HIDDEN, &config.forced_hidden),
        ready: merged(READY, &config.ready_routes),
    }
}

/// Builds the application's route table.
pub fn build_table(config: &ResolvedConfig) -> RouteTable {
    let policy = policy(config);
    debug!("Route policy: {:?}", policy);
    ROUTES
        .iter()
        .fold(RouteTable::new(policy, fallbacks()), |table, (path, title, visibility)| {
            table.with_route(path, *visibility, named_page(*title))
        })
}
