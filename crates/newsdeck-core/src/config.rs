use crate::session::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Loaded from `config.toml`; the CLI layers env vars and flags on top.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Identity supplied by the auth backend, if someone is signed in
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/newsdeck/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("newsdeck");

        Ok(config_dir.join("config.toml"))
    }

    /// Where bookmarks and preferences live: the configured override, or
    /// `<data dir>/newsdeck/storage.db`
    pub fn storage_path(&self) -> crate::Result<PathBuf> {
        if let Some(ref path) = self.storage.path {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("newsdeck");

        Ok(data_dir.join("storage.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// newsdata.io key, get one at https://newsdata.io/register
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout; unset means the HTTP client's default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_base_url() -> String {
    "https://newsdata.io/api/1".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            language: default_language(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the SQLite file
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Articles per list page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Stories in the breaking news carousel
    #[serde(default = "default_breaking_size")]
    pub breaking_size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn default_breaking_size() -> u32 {
    5
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            breaking_size: default_breaking_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://newsdata.io/api/1");
        assert_eq!(config.api.language, "en");
        assert_eq!(config.ui.page_size, 10);
        assert_eq!(config.ui.breaking_size, 5);
        assert!(config.api.timeout().is_none());
        assert!(config.user.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            api_key = "pub_123"
            timeout_secs = 15

            [user]
            uid = "u1"
            full_name = "Grace Hopper"
            email = "grace@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key.as_deref(), Some("pub_123"));
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.api.language, "en");
        assert_eq!(config.ui.page_size, 10);
        assert_eq!(config.user.unwrap().full_name, "Grace Hopper");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("newsdeck").join("config.toml");

        let mut config = Config::default();
        config.ui.page_size = 20;
        config.storage.path = Some(dir.path().join("bookmarks.db"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.ui.page_size, 20);
        assert_eq!(loaded.storage_path().unwrap(), dir.path().join("bookmarks.db"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(loaded.ui.breaking_size, 5);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbroken").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }
}
