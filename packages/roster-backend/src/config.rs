//! Configuration for the roster backend.
//! Reads backend.json from ~/.config/roster/backend.json (or platform equivalent),
//! or from the path in ROSTER_CONFIG.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "ROSTER_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Project/member store file. Defaults to the platform data dir.
    #[serde(default)]
    pub data_file: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            data_file: None,
        }
    }
}

impl BackendConfig {
    pub fn data_path(&self) -> PathBuf {
        match &self.data_file {
            Some(file) => PathBuf::from(file),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("roster")
                .join("projects.json"),
        }
    }
}

/// Config path: $ROSTER_CONFIG, else ~/.config/roster/backend.json
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roster")
        .join("backend.json")
}

/// Load config from path. Returns default if file doesn't exist or can't be parsed.
pub fn load_config(path: &Path) -> BackendConfig {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config {}: {}", path.display(), e);
            BackendConfig::default()
        }),
        Err(_) => {
            log::info!("No config at {}, using defaults", path.display());
            BackendConfig::default()
        }
    }
}
