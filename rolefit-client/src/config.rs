//! Client configuration
//!
//! Handles:
//! - Backend base URL (config file, `.env`, `ROLEFIT_API_BASE_URL`)
//! - Connect timeout
//! - Which token store persists the session
//! - Cross-platform storage of the config file itself

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::error::SessionError;
use crate::session::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const BASE_URL_ENV: &str = "ROLEFIT_API_BASE_URL";
const APP_DIR: &str = "rolefit";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub store: TokenStoreKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    File,
    Keyring,
    Memory,
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                connect_timeout_secs: default_connect_timeout(),
            },
            session: SessionConfig {
                store: TokenStoreKind::File,
            },
        }
    }
}

impl ClientConfig {
    /// Load config from the OS-specific location, then apply `.env` and
    /// environment overrides.
    pub async fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::load_from(&Self::config_file_path()?).await?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// Save config to the OS-specific location
    pub async fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path).await?;
        Ok(path)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Overlay environment values; `lookup` is usually `std::env::var`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push(APP_DIR);
        path.push("config.toml");
        Ok(path)
    }

    /// Check if this is first-time setup
    pub fn is_first_time_setup() -> bool {
        Self::config_file_path()
            .map(|p| !p.exists())
            .unwrap_or(true)
    }

    /// Open the token store selected by `session.store`.
    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>, SessionError> {
        let store: Arc<dyn TokenStore> = match self.session.store {
            TokenStoreKind::File => Arc::new(FileTokenStore::in_config_dir()?),
            TokenStoreKind::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenStoreKind::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}

/// Directory holding `config.toml` and `session.toml`.
pub(crate) fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.connect_timeout_secs, 10);
        assert_eq!(config.session.store, TokenStoreKind::File);
    }

    #[test]
    fn test_env_overrides_base_url() {
        let mut config = ClientConfig::default();
        config.apply_env(|key| {
            (key == BASE_URL_ENV).then(|| " https://bench.example.com/api ".to_string())
        });
        assert_eq!(config.api.base_url, "https://bench.example.com/api");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env(|_| Some("   ".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("nope.toml")).await.unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "http://10.0.0.5:8000/api".into();
        config.session.store = TokenStoreKind::Keyring;
        config.save_to(&path).await.unwrap();

        let loaded = ClientConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_timeout_defaults_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(
            &path,
            "[api]\nbase_url = \"http://x/api\"\n\n[session]\nstore = \"memory\"\n",
        )
        .await
        .unwrap();

        let loaded = ClientConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded.api.connect_timeout_secs, 10);
        assert_eq!(loaded.session.store, TokenStoreKind::Memory);
    }

    #[test]
    fn test_config_file_path() {
        if let Ok(path) = ClientConfig::config_file_path() {
            assert!(path.to_string_lossy().contains("rolefit"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }
}
