use crate::error::{PaperzError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for paperz, stored in the platform config directory.
///
/// The server URL and auth token can always be overridden through the
/// `PAPERLESS_SERVER_URL` and `PAPERLESS_AUTH_TOKEN` environment
/// variables; the token is only ever read from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaperzConfig {
    /// Base API URL, e.g. `https://paper.example.com/api`
    #[serde(default)]
    pub server_url: Option<String>,

    /// Default filename pattern for exports (see the pattern module)
    #[serde(default)]
    pub filename_pattern: Option<String>,
}

impl PaperzConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PaperzError::Io)?;
        let config: PaperzConfig =
            serde_json::from_str(&content).map_err(PaperzError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(PaperzError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(PaperzError::Serialization)?;
        fs::write(config_path, content).map_err(PaperzError::Io)?;
        Ok(())
    }

    /// Effective server URL: environment override, then config.
    pub fn server_url(&self) -> Result<String> {
        env::var("PAPERLESS_SERVER_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.server_url.clone())
            .ok_or_else(|| {
                PaperzError::Api(
                    "No server configured. Set PAPERLESS_SERVER_URL or the server_url config key."
                        .into(),
                )
            })
    }

    /// Auth token, environment only.
    pub fn auth_token(&self) -> Result<String> {
        env::var("PAPERLESS_AUTH_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                PaperzError::Api("No auth token configured. Set PAPERLESS_AUTH_TOKEN.".into())
            })
    }

    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        vec![
            (
                "server-url",
                self.server_url.clone().unwrap_or_default(),
            ),
            (
                "filename-pattern",
                self.filename_pattern.clone().unwrap_or_default(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_config_gives_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = PaperzConfig::load(temp_dir.path().join("nowhere")).unwrap();
        assert_eq!(config, PaperzConfig::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();

        let config = PaperzConfig {
            server_url: Some("https://paper.example/api".into()),
            filename_pattern: Some("[Doc]-YYYY-MM".into()),
        };
        config.save(temp_dir.path()).unwrap();

        let loaded = PaperzConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn serialization_roundtrip() {
        let config = PaperzConfig {
            server_url: Some("https://x/api".into()),
            filename_pattern: None,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PaperzConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
