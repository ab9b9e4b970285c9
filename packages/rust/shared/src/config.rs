//! Application configuration for debrisscan.
//!
//! User config lives at `~/.debrisscan/debrisscan.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DebrisError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "debrisscan.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".debrisscan";

// ---------------------------------------------------------------------------
// Config structs (matching debrisscan.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Crawl pacing and retry defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Correlation settings.
    #[serde(default)]
    pub correlation: CorrelationConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Pacing delay in ms between consecutive fleet requests.
    ///
    /// 700 is the conservative deployment value; 150 is also known to work
    /// on smaller servers.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum fetch attempts per request.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Fixed delay in ms between retry attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    700
}
fn default_max_attempts() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_backoff_ms() -> u64 {
    2000
}

/// `[correlation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Allowed relative deviation between a published debris value and a
    /// candidate's computed value. 0 requires exact equality.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Pacing delay in ms between consecutive fleet requests.
    pub request_delay_ms: u64,
    /// Maximum fetch attempts per request.
    pub max_attempts: u32,
    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,
    /// Fixed delay in ms between retry attempts.
    pub backoff_ms: u64,
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            request_delay_ms: config.defaults.request_delay_ms,
            max_attempts: config.defaults.max_attempts,
            timeout_secs: config.defaults.timeout_secs,
            backoff_ms: config.defaults.backoff_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.debrisscan/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DebrisError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.debrisscan/debrisscan.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DebrisError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DebrisError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DebrisError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DebrisError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DebrisError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that a correlation tolerance is usable (finite, non-negative).
pub fn validate_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(DebrisError::config(format!(
            "tolerance must be a non-negative fraction, got {tolerance}"
        )))
    }
}
