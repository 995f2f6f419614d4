//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.navigators/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NavigatorsConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub flow: Option<String>,
    pub log_file: Option<String>,
    pub log_level: Option<String>,
    pub exit_on_root_back: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub show_state: Option<bool>,
    pub show_breadcrumbs: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "navigators.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
pub const DEFAULT_EXIT_ON_ROOT_BACK: bool = true;
pub const DEFAULT_SHOW_STATE: bool = false;
pub const DEFAULT_SHOW_BREADCRUMBS: bool = true;

const CONFIG_DIR: &str = ".navigators";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// `None` runs the built-in demo flow.
    pub flow: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
    pub exit_on_root_back: bool,
    pub show_state: bool,
    pub show_breadcrumbs: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid flow: {0}")]
    Flow(String),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the `~/.navigators` directory.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR))
}

/// Returns the path to `~/.navigators/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.navigators/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `NavigatorsConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<NavigatorsConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(NavigatorsConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(NavigatorsConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<NavigatorsConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: NavigatorsConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Navigators Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# flow = "onboarding.toml"          # Relative paths resolve against ~/.navigators/
#                                   # Or set NAVIGATORS_FLOW env var
# log_file = "navigators.log"
# log_level = "info"                # "off", "error", "warn", "info", "debug", "trace"
#                                   # Or set NAVIGATORS_LOG_LEVEL env var
# exit_on_root_back = true          # Back on the first page quits

# [display]
# show_state = false                # Show the running state under each page
# show_breadcrumbs = true           # Show the navigator path in the title bar
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub flow: Option<PathBuf>,
    pub log_level: Option<LevelFilter>,
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &NavigatorsConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, config_dir().as_deref(), |key| {
        std::env::var(key).ok()
    })
}

/// [`resolve`] with an explicit config directory and environment lookup.
pub fn resolve_with_env(
    config: &NavigatorsConfig,
    cli: &CliOverrides,
    config_dir: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Flow: CLI → env → config (relative to the config dir)
    let flow = cli
        .flow
        .clone()
        .or_else(|| env("NAVIGATORS_FLOW").map(PathBuf::from))
        .or_else(|| {
            config.general.flow.as_ref().map(|f| {
                let path = PathBuf::from(f);
                match config_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path,
                }
            })
        });

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .or_else(|| env("NAVIGATORS_LOG_LEVEL").and_then(|l| parse_level(&l)))
        .or_else(|| config.general.log_level.as_deref().and_then(parse_level))
        .unwrap_or(DEFAULT_LOG_LEVEL);

    ResolvedConfig {
        flow,
        log_file: config
            .general
            .log_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        log_level,
        exit_on_root_back: config
            .general
            .exit_on_root_back
            .unwrap_or(DEFAULT_EXIT_ON_ROOT_BACK),
        show_state: config.display.show_state.unwrap_or(DEFAULT_SHOW_STATE),
        show_breadcrumbs: config
            .display
            .show_breadcrumbs
            .unwrap_or(DEFAULT_SHOW_BREADCRUMBS),
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    match LevelFilter::from_str(raw.trim()) {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring unknown log level {:?}", raw);
            None
        }
    }
}
