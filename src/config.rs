use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

use crate::sync::DEFAULT_BASE_URL;

pub const ENV_DATABASE_PATH: &str = "WEDDMATE_DATABASE_PATH";
pub const ENV_API_URL: &str = "WEDDMATE_API_URL";
pub const ENV_API_TOKEN: &str = "WEDDMATE_API_TOKEN";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Base URL of the WeddMate API
    pub api_url: ConfigValue<String>,
    /// Bearer token for the API
    #[serde(serialize_with = "serialize_masked")]
    pub api_token: ConfigValue<Option<String>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    api_url: Option<String>,
    api_token: Option<String>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading overrides through `env` instead of the
    /// process environment.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("weddmate.db"),
            ConfigSource::Default,
        );
        let mut api_url = ConfigValue::new(DEFAULT_BASE_URL.to_string(), ConfigSource::Default);
        let mut api_token = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            // A file with only comments is an empty document.
            let file_config: ConfigFile = serde_yaml::from_str::<Option<ConfigFile>>(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?
                .unwrap_or_default();

            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve_relative(&path, db_path), ConfigSource::File);
            }
            if let Some(url) = file_config.api_url {
                api_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(token) = file_config.api_token {
                api_token = ConfigValue::new(Some(token), ConfigSource::File);
            }
            config_file = Some(path);
        }

        if let Some(db_path) = env(ENV_DATABASE_PATH) {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(url) = env(ENV_API_URL) {
            api_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Some(token) = env(ENV_API_TOKEN).filter(|t| !t.is_empty()) {
            api_token = ConfigValue::new(Some(token), ConfigSource::Environment);
        }

        Ok(Self {
            database_path,
            api_url,
            api_token,
            config_file,
        })
    }

    /// The token with everything but its first four characters hidden, or
    /// hidden completely when it is short.
    pub fn masked_token(&self) -> Option<String> {
        self.api_token.value.as_deref().map(mask)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/weddmate/
    /// - macOS: ~/Library/Application Support/weddmate/
    /// - Windows: %APPDATA%/weddmate/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weddmate")
    }

    /// Default data directory, e.g. ~/.local/share/weddmate/ on Linux
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weddmate")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

// Relative paths in the file are relative to the file itself.
fn resolve_relative(config_path: &Path, db_path: PathBuf) -> PathBuf {
    if db_path.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&db_path))
            .unwrap_or(db_path)
    } else {
        db_path
    }
}

// Tokens too short to spare four characters are hidden entirely.
const MIN_PARTIAL_MASK_LEN: usize = 12;

fn mask(token: &str) -> String {
    if token.chars().count() < MIN_PARTIAL_MASK_LEN {
        return "****".to_string();
    }
    let visible: String = token.chars().take(4).collect();
    format!("{}...", visible)
}

fn serialize_masked<S>(value: &ConfigValue<Option<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ConfigValue::new(value.value.as_deref().map(mask), value.source.clone()).serialize(serializer)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
