//! # Navigation Core
//!
//! URL interpretation and navigation state. It knows nothing about how a
//! page is rendered, and reaches the browser only through the ports in
//! [`crate::platform`].
//!
//! ```text
//!   host location ──► path::resolve ──► NavigationStore ──► consumers
//!                                            ▲              (watch::Receiver)
//!   navigate(to) ────────────────────────────┤
//!   back/forward (PopState) ─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`path`]: normalization and legacy redirect decoding, pure functions
//! - [`store`]: `NavigationStore`, the single owner of `{path, search}`
//! - [`config`]: layered settings (file, env, CLI)

pub mod config;
pub mod path;
pub mod store;

pub use path::NavigationState;
pub use store::{NavigationStore, PopState};
