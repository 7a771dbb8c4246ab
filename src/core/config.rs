//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.wayfinder/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::DEFAULT_LOAD_TIMEOUT;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WayfinderConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub production: Option<bool>,
    pub load_timeout_ms: Option<u64>,
}

/// Additions to the built-in route lists.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub ready: Vec<String>,
    #[serde(default)]
    pub always_public: Vec<String>,
    #[serde(default)]
    pub forced_hidden: Vec<String>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub production: bool,
    pub load_timeout: Duration,
    pub ready_routes: Vec<String>,
    pub always_public: Vec<String>,
    pub forced_hidden: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.wayfinder/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".wayfinder").join("config.toml"))
}

/// Load config from `~/.wayfinder/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `WayfinderConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<WayfinderConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(WayfinderConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(WayfinderConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: WayfinderConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Wayfinder Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# production = false                 # Or set WAYFINDER_ENV=production
# load_timeout_ms = 8000             # Or set WAYFINDER_LOAD_TIMEOUT_MS

# Added to the built-in route lists.
# [routes]
# ready = ["/build"]
# always_public = ["/docs"]
# forced_hidden = ["/test/spectacular"]
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Interprets `WAYFINDER_ENV`. Unrecognized values are ignored.
fn parse_environment(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "production" | "prod" => Some(true),
        "development" | "dev" => Some(false),
        other => {
            warn!("Ignoring unknown WAYFINDER_ENV value: {}", other);
            None
        }
    }
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_production` forces a production build when true.
pub fn resolve(config: &WayfinderConfig, cli_production: bool) -> ResolvedConfig {
    // Production: CLI → env → config → default (development)
    let production = cli_production
        || std::env::var("WAYFINDER_ENV")
            .ok()
            .and_then(|v| parse_environment(&v))
            .or(config.general.production)
            .unwrap_or(false);

    // Load timeout: env → config → default
    let load_timeout = std::env::var("WAYFINDER_LOAD_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .or(config.general.load_timeout_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_LOAD_TIMEOUT);

    ResolvedConfig {
        production,
        load_timeout,
        ready_routes: config.routes.ready.clone(),
        always_public: config.routes.always_public.clone(),
        forced_hidden: config.routes.forced_hidden.clone(),
    }
}
