//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/hyperdoc/config.toml)
//! 3. Environment variables (HYPERDOC_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::transport::DEFAULT_TIMEOUT_SECS;

/// Environment variable prefix
const ENV_PREFIX: &str = "HYPERDOC";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document URL used when a command doesn't name one
    #[serde(default)]
    pub api_url: Option<String>,

    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            access_token: None,
            timeout_secs: default_timeout_secs(),
            user_agent: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (HYPERDOC_API_URL, HYPERDOC_TOKEN, ...)
    /// 2. Config file (~/.config/hyperdoc/config.toml or HYPERDOC_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config
                .validate()
                .with_context(|| format!("Invalid config file: {:?}", path))?;
            config
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.validate()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values the HTTP client cannot use
    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // HYPERDOC_API_URL
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            self.api_url = if val.is_empty() { None } else { Some(val) };
        }

        // HYPERDOC_TOKEN
        if let Ok(val) = std::env::var(format!("{}_TOKEN", ENV_PREFIX)) {
            self.access_token = if val.is_empty() { None } else { Some(val) };
        }

        // HYPERDOC_TIMEOUT_SECS (ignored unless a positive integer)
        if let Ok(val) = std::env::var(format!("{}_TIMEOUT_SECS", ENV_PREFIX)) {
            if let Ok(secs) = val.trim().parse::<u64>() {
                if secs > 0 {
                    self.timeout_secs = secs;
                }
            }
        }

        // HYPERDOC_LOG_LEVEL
        if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
            self.log_level = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with HYPERDOC_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hyperdoc")
            .join("config.toml")
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "HYPERDOC_API_URL",
        "HYPERDOC_TOKEN",
        "HYPERDOC_TIMEOUT_SECS",
        "HYPERDOC_LOG_LEVEL",
        "HYPERDOC_CONFIG",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_url.is_none());
        assert!(config.access_token.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_file_path_override() {
        let _guard = EnvGuard::new(ENV_VARS);

        assert!(Config::config_file_path().ends_with("hyperdoc/config.toml"));

        env::set_var("HYPERDOC_CONFIG", "/tmp/custom.toml");
        assert_eq!(Config::config_file_path(), PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_env_override_api_url_and_token() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("HYPERDOC_API_URL", "https://api.example.com/");
        env::set_var("HYPERDOC_TOKEN", "abc123");
        config.apply_env_overrides();

        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com/"));
        assert_eq!(config.access_token.as_deref(), Some("abc123"));

        // Empty string clears it
        env::set_var("HYPERDOC_TOKEN", "");
        config.apply_env_overrides();
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_env_override_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("HYPERDOC_TIMEOUT_SECS", "5");
        config.apply_env_overrides();
        assert_eq!(config.timeout_secs, 5);

        // Garbage and zero are ignored
        env::set_var("HYPERDOC_TIMEOUT_SECS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.timeout_secs, 5);

        env::set_var("HYPERDOC_TIMEOUT_SECS", "0");
        config.apply_env_overrides();
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            api_url = "https://api.example.com/"
            access_token = "file-token"
            timeout_secs = 12
            log_level = "debug"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com/"));
        assert_eq!(config.access_token.as_deref(), Some("file-token"));
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_env_beats_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        env::set_var("HYPERDOC_TOKEN", "env-token");
        let config = Config::load_from_str(r#"access_token = "file-token""#).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/hyperdoc/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.api_url.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            api_url: Some("https://api.example.com/".to_string()),
            access_token: Some("saved-token".to_string()),
            timeout_secs: 7,
            user_agent: Some("test-agent".to_string()),
            log_level: None,
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_with_cli_override(Some(&path)).unwrap();
        assert_eq!(loaded.api_url, config.api_url);
        assert_eq!(loaded.access_token, config.access_token);
        assert_eq!(loaded.timeout_secs, 7);
        assert_eq!(loaded.user_agent.as_deref(), Some("test-agent"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"not a number\"").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let _guard = EnvGuard::new(ENV_VARS);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 0").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        assert!(format!("{:#}", err).contains("timeout_secs must be greater than zero"));

        assert!(Config::load_from_str("timeout_secs = 0").is_err());
        assert_eq!(Config::load_from_str("timeout_secs = 5").unwrap().timeout_secs, 5);
    }
}
