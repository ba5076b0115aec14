//! Configuration management
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/airbased` on Linux). `AIRBASED_CONFIG_DIR` overrides the
//! directory; `AIRTABLE_API_KEY` and `AIRBASED_DEBUG` override individual
//! values.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0/";

const CONFIG_DIR_ENV: &str = "AIRBASED_CONFIG_DIR";
const API_KEY_ENV: &str = "AIRTABLE_API_KEY";
const DEBUG_ENV: &str = "AIRBASED_DEBUG";
const CONFIG_FILE: &str = "config.toml";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default API key, used when no base, table or call overrides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API root URL
    pub base_url: String,

    /// Mirror every outgoing request to the `airbased::wire` log target
    pub debug: bool,

    /// User-Agent header value
    pub user_agent: String,

    /// Per-request transport timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            debug: false,
            user_agent: format!("airbased/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Configuration with only an API key set
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Overlay values from the environment
    pub fn apply_env(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }
        if let Ok(debug) = std::env::var(DEBUG_ENV) {
            self.debug = matches!(debug.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base_url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] on disk
#[derive(Debug, Clone)]
pub struct ConfigManager {
    dir: PathBuf,
}

impl ConfigManager {
    /// Manager for the default config directory
    pub fn new() -> Result<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .ok_or_else(|| Error::Config("Could not determine config directory".into()))?
                .join("airbased"),
        };
        Ok(Self { dir })
    }

    /// Manager for an explicit directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load the config file; a missing file yields defaults
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config file, creating the directory if needed
    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        std::fs::create_dir_all(&self.dir)?;
        let contents = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(self.config_path(), contents)?;
        Ok(())
    }
}
