//! Bootstrap configuration and root folder resolution
//!
//! Configuration is two-tier:
//! 1. **TOML Bootstrap**: database path, logging, provider endpoint (read once at startup)
//! 2. **Database Runtime**: selections and other state live in the key-value store
//!
//! # Root Folder Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`COSTAR_ROOT`)
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file never aborts startup: defaults are used and a warning is logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "COSTAR_ROOT";

/// Environment variable overriding the provider API key
pub const API_KEY_ENV_VAR: &str = "COSTAR_TMDB_API_KEY";

const CONFIG_FILE_NAME: &str = "costar.toml";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Path to SQLite database file, relative paths resolve against the root folder
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Seed default selections on a first-ever launch
    #[serde(default = "default_seed_defaults")]
    pub seed_defaults: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metadata provider configuration (optional)
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Metadata provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key; `COSTAR_TMDB_API_KEY` takes precedence when set
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("costar.db")
}

fn default_seed_defaults() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            database_path: default_database_path(),
            seed_defaults: default_seed_defaults(),
            logging: LoggingConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration with graceful degradation
    ///
    /// An explicit path is tried first, then the per-user config file. Missing or
    /// unparseable files fall back to defaults with a warning.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let candidate = explicit.map(Path::to_path_buf).or_else(user_config_path);

        let Some(path) = candidate else {
            warn!("No config file found, using built-in defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config unavailable, using built-in defaults");
                Self::default()
            }
        }
    }

    /// Absolute database path for the given root folder
    pub fn database_path(&self, root_folder: &Path) -> PathBuf {
        if self.database_path.is_absolute() {
            self.database_path.clone()
        } else {
            root_folder.join(&self.database_path)
        }
    }
}

impl ProviderConfig {
    /// API key from the environment, falling back to the config file
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Per-user config file location, if it exists
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("costar").join(CONFIG_FILE_NAME))
        .filter(|p| p.exists())
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("costar"))
        .unwrap_or_else(|| PathBuf::from("./costar_data"))
}

/// Create the root folder if it is missing
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(())
}
