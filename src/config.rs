//! Runtime configuration: API endpoint, credentials, target app.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Default platform API endpoint.
const DEFAULT_API_URL: &str = "https://api.nimbus.sh";

/// On-disk TOML configuration (`<config_dir>/nimbusctl/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

/// Fully resolved configuration used to build the API client.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
}

impl Config {
    /// Resolve configuration with environment over file over defaults.
    ///
    /// Every command talks to the platform, so a missing token is fatal.
    pub fn load() -> Result<Self> {
        let file = read_file_config()?;

        let api_url = std::env::var("NIMBUS_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_token = std::env::var("NIMBUS_API_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .or(file.api_token)
            .ok_or_else(|| {
                anyhow!(
                    "No API token found. Set NIMBUS_API_TOKEN or add api_token to {}",
                    config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "the config file".to_string())
                )
            })?;

        Ok(Self { api_url, api_token })
    }
}

/// Resolve the target app from the `--app` flag or `NIMBUS_APP`.
pub fn resolve_app(flag: Option<&str>) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| std::env::var("NIMBUS_APP").ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| anyhow!("No app specified. Pass -a/--app or set NIMBUS_APP"))
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nimbusctl").join("config.toml"))
}

fn read_file_config() -> Result<FileConfig> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
