use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "kvest";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATA_DIR_NAME: &str = "data";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Port for the HTTP API
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Directory holding tenant stores and the registry
    ///  (defaults to <kvest dir>/data)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Default log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            data_dir: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the kvest directory (~/.kvest)
    pub kvest_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Resolved data directory
    pub data_dir: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the kvest directory path (custom or default ~/.kvest)
    pub fn kvest_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new kvest state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let kvest_dir = Self::kvest_dir(custom_path)?;

        if kvest_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&kvest_dir)?;

        let config = config.unwrap_or_default();
        let config_path = kvest_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        let data_dir = resolve_data_dir(&kvest_dir, &config);
        fs::create_dir_all(&data_dir)?;

        Ok(Self {
            kvest_dir,
            config_path,
            data_dir,
            config,
        })
    }

    /// Load existing state from the kvest directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let kvest_dir = Self::kvest_dir(custom_path)?;

        if !kvest_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = kvest_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        let data_dir = resolve_data_dir(&kvest_dir, &config);

        Ok(Self {
            kvest_dir,
            config_path,
            data_dir,
            config,
        })
    }
}

fn resolve_data_dir(kvest_dir: &std::path::Path, config: &AppConfig) -> PathBuf {
    match &config.data_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => kvest_dir.join(dir),
        None => kvest_dir.join(DATA_DIR_NAME),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("kvest directory not initialized. Run 'kvest init' first")]
    NotInitialized,

    #[error("kvest directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
