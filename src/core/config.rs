//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.fxconv/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::networking::{HttpHeader, HttpHeaders, HttpMethod};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FxConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub access_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// A header sent with every request, or only with requests of `method`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
    pub method: Option<HttpMethod>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://api.currencylayer.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "fxconv.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

pub const ENV_BASE_URL: &str = "FXCONV_BASE_URL";
pub const ENV_ACCESS_KEY: &str = "FXCONV_ACCESS_KEY";
pub const ENV_TIMEOUT_SECS: &str = "FXCONV_TIMEOUT_SECS";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub access_key: Option<String>,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
    pub log_file: String,
    pub headers: HttpHeaders,
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

/// Returns the path to `~/.fxconv/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".fxconv").join("config.toml"))
}

/// Load config from `~/.fxconv/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FxConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FxConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FxConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(FxConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<FxConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FxConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config without the access key.
fn redacted(config: &FxConfig) -> String {
    format!(
        "general={:?}, base_url={:?}, access_key={}, timeout={:?}, headers={}",
        config.general,
        config.api.base_url,
        if config.api.access_key.is_some() { "<set>" } else { "<unset>" },
        config.api.request_timeout_secs,
        config.headers.len()
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# fxconv Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                # "off", "error", "warn", "info", "debug", "trace"
# log_file = "fxconv.log"

# [api]
# base_url = "http://api.currencylayer.com"   # Or set FXCONV_BASE_URL env var
# access_key = "..."                          # Or set FXCONV_ACCESS_KEY env var
# request_timeout_secs = 30                   # Or set FXCONV_TIMEOUT_SECS env var

# [[headers]]
# name = "Accept-Language"
# value = "en-US"

# [[headers]]
# name = "X-Request-Source"
# value = "cli"
# method = "POST"                    # Only sent with POST requests
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

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the CLI flag (None = not specified).
pub fn resolve(config: &FxConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_base_url, |key| std::env::var(key).ok())
}

/// `resolve` with environment lookups going through `env`.
pub fn resolve_with<F>(config: &FxConfig, cli_base_url: Option<&str>, env: F) -> ResolvedConfig
where
    F: Fn(&str) -> Option<String>,
{
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env(ENV_BASE_URL))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Access key: env → config
    let access_key = env(ENV_ACCESS_KEY)
        .or_else(|| config.api.access_key.clone())
        .filter(|k| !k.trim().is_empty());

    // Timeout: env → config → default
    let timeout_secs = env(ENV_TIMEOUT_SECS)
        .and_then(|s| match s.parse::<u64>() {
            Ok(secs) => Some(secs),
            Err(e) => {
                warn!("Ignoring FXCONV_TIMEOUT_SECS={s:?}: {e}");
                None
            }
        })
        .or(config.api.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

    ResolvedConfig {
        base_url,
        access_key,
        request_timeout: Duration::from_secs(timeout_secs),
        log_level: resolve_log_level(config),
        log_file: config
            .general
            .log_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        headers: resolve_headers(&config.headers),
    }
}

fn resolve_log_level(config: &FxConfig) -> LevelFilter {
    match config.general.log_level.as_deref() {
        None => DEFAULT_LOG_LEVEL,
        Some(level) => level.parse().unwrap_or_else(|_| {
            warn!("Unknown log level {level:?}, using {DEFAULT_LOG_LEVEL}");
            DEFAULT_LOG_LEVEL
        }),
    }
}

fn resolve_headers(entries: &[HeaderEntry]) -> HttpHeaders {
    entries
        .iter()
        .map(|entry| {
            let header = match entry.method {
                Some(method) => HttpHeader::scoped(method, entry.value.clone()),
                None => HttpHeader::new(entry.value.clone()),
            };
            (entry.name.clone(), header)
        })
        .collect()
}
