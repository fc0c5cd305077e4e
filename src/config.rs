//! Credential and secrets loading
//!
//! The GitHub token comes from the `GITHUB_TOKEN` environment variable or
//! from `~/.repo-keeper/config.yaml`; the same file can carry the default
//! organization. Webhook targets and similar sensitive values live in a
//! separate flat secrets file passed on the command line.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_DIR: &str = ".repo-keeper";
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no GitHub token found: set GITHUB_TOKEN or add 'github_token' to {0}")]
    MissingToken(String),

    #[error("missing value for secret '{0}'")]
    MissingSecret(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeeperConfig {
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

impl KeeperConfig {
    /// Load the user's config file, or defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Environment wins over the config file.
    pub fn github_token(&self) -> Result<String, ConfigError> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        self.github_token.clone().ok_or_else(|| {
            let path = config_file_path()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| format!("~/{CONFIG_DIR}/{CONFIG_FILE}"));
            ConfigError::MissingToken(path)
        })
    }
}

fn config_file_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Named secrets loaded from a flat YAML map.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: BTreeMap<String, String>,
}

impl Secrets {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let values = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { values })
    }

    pub fn resolve(&self, name: &str) -> Result<&str, ConfigError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingSecret(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_secrets_resolution() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secrets.yaml");
        fs::write(&path, "issues_slack_webhook_url: https://example.test/hook\n").unwrap();

        let secrets = Secrets::from_file(&path).unwrap();
        assert_eq!(
            secrets.resolve("issues_slack_webhook_url").unwrap(),
            "https://example.test/hook"
        );
        let error = secrets.resolve("unknown").unwrap_err();
        assert!(error.to_string().contains("unknown"));
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "github_token: token123\norganization: acme\n").unwrap();

        let config = KeeperConfig::from_file(&path).unwrap();
        assert_eq!(config.organization.as_deref(), Some("acme"));
        assert_eq!(config.github_token.as_deref(), Some("token123"));
    }

    #[test]
    fn test_unreadable_secrets_report_the_path() {
        let error = Secrets::from_file(Path::new("/nonexistent/secrets.yaml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/secrets.yaml"));
    }
}
