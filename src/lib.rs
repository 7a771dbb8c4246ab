//! Wayfinder: navigation and code-loading core for a single-page application.

pub mod core;
pub mod loader;
pub mod platform;
pub mod router;
pub mod routes;

#[cfg(test)]
pub mod test_support;

pub use router::{PageView, Platform, Router};
