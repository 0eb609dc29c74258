use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_LOGIN_LATENCY_MS, HTTP_REQUEST_TIMEOUT_SECS, SESSION_FILE_NAME,
};
use crate::session::RestorePolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote quotes API
    #[serde(default)]
    pub api: ApiConfig,

    /// Session handling
    #[serde(default)]
    pub session: SessionConfig,
}

/// Remote quotes API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the version prefix
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where the session is persisted (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
    /// Simulated sign-in round trip
    pub login_latency_ms: u64,
    /// How a saved user is treated at startup
    pub restore_policy: RestorePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            login_latency_ms: DEFAULT_LOGIN_LATENCY_MS,
            restore_policy: RestorePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Resolve the session file location
    pub fn storage_file(&self) -> Result<PathBuf> {
        match &self.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(get_data_dir()?.join(SESSION_FILE_NAME)),
        }
    }
}

/// Load configuration from multiple sources.
///
/// Later sources win: defaults, global config, project config, the file
/// given on the command line, then `ELECTRYSURE_` environment variables
/// (nested keys separated by `__`, e.g. `ELECTRYSURE_API__BASE_URL`).
pub fn load_config(config_file: Option<&Path>) -> Result<Config> {
    let config_dir = get_config_dir()?;
    let global_config = config_dir.join("config.toml");
    let local_config = PathBuf::from(".electrysure/config.toml");

    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(&global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    if let Some(path) = config_file {
        if !path.exists() {
            anyhow::bail!("Configuration file not found: {}", path.display());
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("ELECTRYSURE_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "electrysure")
}

fn home_fallback(subdir: &str) -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Could not determine home directory")?;
    Ok(PathBuf::from(home).join(subdir).join("electrysure"))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = match project_dirs() {
        Some(dirs) => dirs.config_dir().to_path_buf(),
        None => home_fallback(".config")?,
    };
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}

/// Get the directory holding persisted client state
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = match project_dirs() {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => home_fallback(".local/share")?,
    };
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

/// Create a default configuration file if it doesn't exist.
///
/// Writes to `config_file` when given, otherwise to the global config
/// directory. Returns the path of the file when one was written.
pub fn init_config(config_file: Option<&Path>) -> Result<Option<PathBuf>> {
    let config_file = match config_file {
        Some(path) => path.to_path_buf(),
        None => get_config_dir()?.join("config.toml"),
    };

    if config_file.exists() {
        return Ok(None);
    }
    if let Some(parent) = config_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    save_config(&Config::default(), Some(config_file.clone()))?;
    Ok(Some(config_file))
}
