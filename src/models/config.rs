//! Configuration model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TheTVDB configuration.
    pub tvdb: TvDbConfig,
    /// Persisted state file.
    pub state_file: PathBuf,
    /// Default directory for cached catalog archives.
    pub working_directory: PathBuf,
    /// Maximum concurrent catalog downloads.
    pub fetch_concurrency: usize,
}

/// TheTVDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TvDbConfig {
    /// API base URL.
    pub base_url: String,
    /// API key (required for episode archives).
    pub api_key: Option<String>,
    /// Catalog language.
    pub language: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path();
        Self {
            tvdb: TvDbConfig::default(),
            state_file: data_dir.join("state.json"),
            working_directory: data_dir,
            fetch_concurrency: 5,
        }
    }
}

impl Default for TvDbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://thetvdb.com".to_string(),
            api_key: None,
            language: "en".to_string(),
            timeout: 30,
        }
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recording_organizer")
}

/// Get the local data directory path.
fn dirs_data_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("recording_organizer")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from file, falling back to defaults.
///
/// `TVDB_API_KEY` overrides the key from the file.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let mut config = Config::default();
    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(parsed) => config = parsed,
                Err(e) => tracing::warn!(
                    "Ignoring invalid config {}: {}",
                    config_path.display(),
                    e
                ),
            },
            Err(e) => tracing::warn!("Cannot read config {}: {}", config_path.display(), e),
        }
    }

    if let Ok(key) = std::env::var("TVDB_API_KEY") {
        if !key.is_empty() {
            config.tvdb.api_key = Some(key);
        }
    }
    if config.fetch_concurrency == 0 {
        config.fetch_concurrency = 1;
    }

    config
}
