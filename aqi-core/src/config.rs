use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::client::AqiClient;

pub const DEFAULT_API_HOST: &str = "api.waqi.info";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_host = "api.waqi.info"
/// token = "..."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_host")]
    pub api_host: String,

    #[serde(default)]
    pub token: Option<String>,
}

fn default_api_host() -> String {
    DEFAULT_API_HOST.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            token: None,
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("info", "aqi", "aqi-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Token to send, empty when none is configured.
    ///
    /// A missing token is still attempted; the API rejects it as an invalid key.
    pub fn token_or_empty(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }

    /// Problems worth telling the user about before fetching. Never fatal.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            warnings.push(
                "API token is missing.\n\
                 Hint: run `aqi configure` and enter your token."
                    .to_string(),
            );
        }

        if self.api_host.trim().is_empty() {
            warnings.push(format!(
                "API host is empty. The default is '{DEFAULT_API_HOST}'."
            ));
        }

        warnings
    }

    /// Build a client from the configured host and token.
    pub fn client(&self) -> AqiClient {
        AqiClient::new(&self.api_host, self.token_or_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load should succeed");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api_host, DEFAULT_API_HOST);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_host: "aqi.example.org".into(),
            token: Some("TOKEN".into()),
        };

        cfg.save_to(&path).expect("save should succeed");
        let loaded = Config::load_from(&path).expect("load should succeed");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn host_defaults_when_absent_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "token = \"abc\"\n").expect("write");

        let cfg = Config::load_from(&path).expect("load should succeed");

        assert_eq!(cfg.api_host, DEFAULT_API_HOST);
        assert_eq!(cfg.token_or_empty(), "abc");
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "token = ").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn missing_token_is_a_warning_not_an_error() {
        let cfg = Config::default();

        let warnings = cfg.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("API token is missing"));

        assert_eq!(cfg.token_or_empty(), "");
        assert!(cfg.client().request_url(crate::Coordinate::new(1.0, 2.0)).is_ok());
    }

    #[test]
    fn blank_token_and_host_both_warn() {
        let cfg = Config {
            api_host: " ".into(),
            token: Some("  ".into()),
        };
        assert_eq!(cfg.warnings().len(), 2);
    }

    #[test]
    fn configured_token_has_no_warnings() {
        let cfg = Config {
            token: Some("KEY".into()),
            ..Config::default()
        };
        assert!(cfg.warnings().is_empty());
    }
}
