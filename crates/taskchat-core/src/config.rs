use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const BACKEND_URL_ENV: &str = "TASKCHAT_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub backend_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn save_backend_url(url: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.backend_url = Some(url.to_string());
        config.save()
    }

    /// Pick the backend URL: explicit flag, then environment, then config file, then default
    pub fn resolve_backend_url(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| std::env::var(BACKEND_URL_ENV).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("taskchat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            backend_url: Some("http://tasks.local:9000".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    // Only test that touches the env var, so the steps run in order
    #[test]
    fn test_env_then_file_then_default() {
        let config = Config {
            backend_url: Some("http://from-config".to_string()),
        };

        std::env::set_var(BACKEND_URL_ENV, "http://from-env");
        assert_eq!(config.resolve_backend_url(None), "http://from-env");

        std::env::set_var(BACKEND_URL_ENV, "");
        assert_eq!(config.resolve_backend_url(None), "http://from-config");

        std::env::remove_var(BACKEND_URL_ENV);
        assert_eq!(config.resolve_backend_url(None), "http://from-config");
        assert_eq!(Config::new().resolve_backend_url(None), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_flag_wins() {
        let config = Config {
            backend_url: Some("http://from-config".to_string()),
        };
        assert_eq!(
            config.resolve_backend_url(Some("http://from-flag")),
            "http://from-flag"
        );
    }
}
