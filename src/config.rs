//! Configuration file parsing
//!
//! Parses the TOML file that tells tools where initiator preferences live
//! and which secret store holds CHAP credentials.

use crate::prefs::FilePreferenceStore;
use crate::secrets::{KeyringSecretStore, MemorySecretStore, SecretStore, CHAP_SERVICE_NAME};
use crate::store::{ConfigStore, RemovalMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory of the preference document
pub const DEFAULT_STORE_PATH: &str = "/var/lib/iscsi-initiator";

/// Default application id, which names the preference document
pub const DEFAULT_APP_ID: &str = "com.github.iscsi-initiator";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tool configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Preference store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Secret store settings
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Preference store settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the preference document
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Application id naming the preference document
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Whether removing a missing entry marks its namespace modified
    #[serde(default)]
    pub removal: RemovalMode,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            app_id: default_app_id(),
            removal: RemovalMode::default(),
        }
    }
}

/// Secret store backend
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    /// Platform keychain or keyring
    #[default]
    Keyring,
    /// Process memory, lost on exit
    Memory,
}

/// Secret store settings
#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretBackend,

    /// Service tag for keyring entries
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_service() -> String {
    CHAP_SERVICE_NAME.to_string()
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            backend: SecretBackend::default(),
            service: default_service(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (off, error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a file, or use defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("No configuration at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Parse configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        let app_id = self.store.app_id.trim();
        if app_id.is_empty() {
            return Err(ConfigError::Invalid("store.app_id must not be empty".to_string()));
        }
        if app_id.contains(&['/', '\\'][..]) || app_id == "." || app_id == ".." {
            return Err(ConfigError::Invalid(format!(
                "store.app_id must be a plain name: {}",
                self.store.app_id
            )));
        }

        if self.secrets.service.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "secrets.service must not be empty".to_string(),
            ));
        }

        let level = self.logging.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown log level: {}",
                self.logging.log_level
            )));
        }

        Ok(())
    }

    /// Preference store described by this configuration
    pub fn preference_store(&self) -> FilePreferenceStore {
        FilePreferenceStore::new(&self.store.path, &self.store.app_id)
    }

    /// Secret store described by this configuration
    pub fn secret_store(&self) -> Box<dyn SecretStore> {
        match self.secrets.backend {
            SecretBackend::Keyring => Box::new(KeyringSecretStore::new(&self.secrets.service)),
            SecretBackend::Memory => Box::new(MemorySecretStore::new()),
        }
    }

    /// Configuration store with empty caches; call `synchronize` to load
    pub fn open_store(&self) -> ConfigStore<FilePreferenceStore, Box<dyn SecretStore>> {
        ConfigStore::new(self.preference_store(), self.secret_store())
            .with_removal_mode(self.store.removal)
    }
}
