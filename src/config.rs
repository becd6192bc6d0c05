use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_SERVER_URL;
use crate::identity::Identity;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { server_url: None }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    #[allow(dead_code)]
    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the backend URL: env var wins, then the config file, then the
    /// fixed default host and port.
    pub fn server_url(&self) -> String {
        std::env::var("CHARLA_SERVER_URL")
            .ok()
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        Ok(app_config_dir()?.join("config.json"))
    }
}

/// Best-effort cache of the submitted identity. Written on login so a later
/// version could prefill the form; deliberately never read back within a
/// session, the login prompt is shown every time.
pub fn cache_identity(identity: &Identity) -> Result<()> {
    cache_identity_to(identity, &app_config_dir()?.join("identity.json"))
}

fn cache_identity_to(identity: &Identity, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(identity)?;
    fs::write(path, content)?;
    Ok(())
}

fn app_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("charla"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.server_url.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.server_url = Some("http://10.0.0.5:8000".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server_url.as_deref(), Some("http://10.0.0.5:8000"));
    }

    #[test]
    fn test_cache_identity_writes_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("identity.json");

        let identity = Identity::new("Ada", "Lovelace", "ada@example.com");
        cache_identity_to(&identity, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let cached: Identity = serde_json::from_str(&content).unwrap();
        assert_eq!(cached, identity);
    }
}
