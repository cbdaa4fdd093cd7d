use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use crate::error::LeetspaceError;

pub const CONFIG_ENV_VAR: &str = "LEETSPACE_CONFIG";
const CONFIG_FILE_NAME: &str = "leetspace.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root directory of the JSON record and lock stores.
    pub data_dir: PathBuf,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Honour the dashboard's day-offset and ignore-lock parameters.
    /// Development and test setups only.
    pub allow_dev_overrides: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            data_dir: app_data_dir().join("data"),
            log_filter: "info".to_string(),
            log_format: LogFormat::Json,
            allow_dev_overrides: false,
        }
    }
}

/// Where the process-wide config came from; logged once logging is up.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults { reason: String },
}

fn app_data_dir() -> PathBuf {
    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.leetspace");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.leetspace");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.leetspace");
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".")
}

pub fn get_config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => PathBuf::from(path),
        None => app_data_dir().join(CONFIG_FILE_NAME),
    }
}

/// Parse a config file. Missing keys take their defaults.
pub fn load_engine_config_from(path: &Path) -> Result<EngineConfig, LeetspaceError> {
    let content = fs::read_to_string(path)
        .map_err(|e| LeetspaceError::new(
            format!("Failed to read config: {}", e),
            "config"
        ).with_context(format!("path: {:?}", path)))?;
    let config = toml::from_str::<EngineConfig>(&content)
        .map_err(|e| LeetspaceError::from(e).with_context(format!("path: {:?}", path)))?;
    Ok(config)
}

fn load_engine_config_internal() -> (EngineConfig, ConfigSource) {
    let config_path = get_config_path();

    if !config_path.exists() {
        return (
            EngineConfig::default(),
            ConfigSource::Defaults { reason: format!("{:?} not found", config_path) },
        );
    }

    match load_engine_config_from(&config_path) {
        Ok(config) => (config, ConfigSource::File(config_path)),
        Err(e) => (EngineConfig::default(), ConfigSource::Defaults { reason: e.to_string() }),
    }
}

lazy_static! {
    static ref ENGINE_CONFIG: (EngineConfig, ConfigSource) = load_engine_config_internal();
}

/// Get the cached engine configuration (loaded once per process)
pub fn get_engine_config() -> &'static EngineConfig {
    &ENGINE_CONFIG.0
}

pub fn get_config_source() -> &'static ConfigSource {
    &ENGINE_CONFIG.1
}
