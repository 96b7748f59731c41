use anyhow::Result;
use mocking_client::{ClientConfig, DEFAULT_API_URL};
use mocking_core::Limits;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-user directory under the platform config/data dirs.
pub const APP_DIR: &str = "mocking";
pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "mocking.log";

/// CLI configuration, read from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Where the token and the log file live.
    pub state_dir: Option<PathBuf>,
    pub limits: Limits,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            state_dir: None,
            limits: Limits::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        let config: CliConfig = serde_yaml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config YAML {}: {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Load from `path` when given, else from the default location if it
    /// exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::load_from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// `--api-url` / `MOCKING_API_URL` win over the file.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from(".mocking"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir().join(LOG_FILE)
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// `<config dir>/mocking/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: CliConfig = serde_yaml::from_str("api_url: https://api.mockingcode.org\n").unwrap();
        assert_eq!(config.api_url, "https://api.mockingcode.org");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_api_url_override() {
        let config = CliConfig::default().with_api_url(Some("http://other:9000".to_string()));
        assert_eq!(config.api_url, "http://other:9000");

        let config = CliConfig::default().with_api_url(Some("  ".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_client_config_carries_timeout() {
        let config = CliConfig {
            timeout_secs: 5,
            ..CliConfig::default()
        };
        assert_eq!(config.client_config().timeout, Duration::from_secs(5));
    }
}
