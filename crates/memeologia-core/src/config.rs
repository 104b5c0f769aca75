//! Application configuration management.
//!
//! This module handles loading and saving the client configuration:
//! the login endpoint, an optional request timeout, and the last email
//! that logged in successfully.
//!
//! Configuration is stored at `~/.config/memeologia/config.json`.
//! `MEMEOLOGIA_LOGIN_URL`, `MEMEOLOGIA_EMAIL` and `MEMEOLOGIA_PASSWORD`
//! override or prefill values at runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_LOGIN_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "memeologia";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const LOGIN_URL_ENV: &str = "MEMEOLOGIA_LOGIN_URL";
const EMAIL_ENV: &str = "MEMEOLOGIA_EMAIL";
const PASSWORD_ENV: &str = "MEMEOLOGIA_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub login_url: Option<String>,
    /// Seconds before the login request is abandoned. Unset means no limit.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config_dir>/memeologia/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the session file and the log file
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Endpoint to post credentials to: env, then config, then the default
    pub fn login_url(&self) -> String {
        std::env::var(LOGIN_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.login_url.clone())
            .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Email to prefill the form with
    pub fn initial_email(&self) -> String {
        std::env::var(EMAIL_ENV)
            .ok()
            .or_else(|| self.last_email.clone())
            .unwrap_or_default()
    }

    /// Password to prefill the form with, for scripted use
    pub fn initial_password() -> String {
        std::env::var(PASSWORD_ENV).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(APP_NAME).join(CONFIG_FILE);
        let config = Config {
            login_url: Some("http://memes.local/login".to_string()),
            request_timeout_secs: Some(15),
            last_email: Some("ana@example.com".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"last_email":"ana@example.com"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.last_email.as_deref(), Some("ana@example.com"));
        assert!(config.login_url.is_none());
    }

    #[test]
    fn test_login_url_from_config() {
        // Only meaningful when the override is not set in the test environment
        if std::env::var(LOGIN_URL_ENV).is_ok() {
            return;
        }
        assert_eq!(Config::default().login_url(), DEFAULT_LOGIN_URL);

        let config = Config {
            login_url: Some("http://memes.local/login".to_string()),
            ..Default::default()
        };
        assert_eq!(config.login_url(), "http://memes.local/login");
    }
}
