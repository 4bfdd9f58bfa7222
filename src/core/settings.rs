use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INTERVAL_MS: u64 = 10_000;
const APP_DIR: &str = "request-poller";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub poller: PollerSettings,
    pub source: SourceSettings,
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub interval_ms: u64,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub items_path: Option<PathBuf>,
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    pub fn default_items_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join(APP_DIR).join("items.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config directory")?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(?path, "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poller.interval_ms == 0 {
            anyhow::bail!("poller.interval_ms must be greater than 0");
        }
        Ok(())
    }

    /// Explicit path wins, then the config file, then the data directory.
    pub fn resolve_items_path(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        cli_override
            .or_else(|| self.source.items_path.clone())
            .or_else(Self::default_items_path)
            .context("No items file configured and no data directory available")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.poller.interval_ms, 10_000);
        assert!(settings.source.items_path.is_none());
        assert!(!settings.debug);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.poller.interval_ms = 0;
        assert!(settings.validate().is_err());

        settings.poller.interval_ms = 1;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            debug = true

            [poller]
            interval_ms = 2500

            [source]
            items_path = "/var/lib/videos/items.json"
        "#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert!(settings.debug);
        assert_eq!(settings.poller.interval_ms, 2500);
        assert_eq!(
            settings.source.items_path,
            Some(PathBuf::from("/var/lib/videos/items.json"))
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str("[source]\n").unwrap();
        assert_eq!(settings.poller.interval_ms, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.poller.interval_ms, DEFAULT_INTERVAL_MS);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[poller]\ninterval_ms = \"soon\"\n").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_items_path_override_wins() {
        let mut settings = Settings::default();
        settings.source.items_path = Some(PathBuf::from("/from/config.json"));

        let resolved = settings
            .resolve_items_path(Some(PathBuf::from("/from/cli.json")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/from/cli.json"));

        let resolved = settings.resolve_items_path(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/config.json"));
    }
}
