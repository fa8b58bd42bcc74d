use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings for runbook-studio, read from `~/.config/runbook-studio/config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one folder per runbook
    pub store_path: PathBuf,
    /// How long fetched content is reused before asking the store again
    #[serde(default = "default_freshness_minutes")]
    pub freshness_minutes: u64,
    /// Reparse scripts while editing and mark parse errors
    #[serde(default = "default_code_analysis")]
    pub code_analysis: bool,
}

fn default_freshness_minutes() -> u64 {
    30
}

fn default_code_analysis() -> bool {
    true
}

impl Config {
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            freshness_minutes: default_freshness_minutes(),
            code_analysis: default_code_analysis(),
        }
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_minutes * 60)
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the store location
        config.store_path = Self::expand_path(&config.store_path).unwrap_or(config.store_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/runbook-studio");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    fn write_config(temp_dir: &TempDir, content: &str) -> PathBuf {
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, content).unwrap();
        config_file
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/runbook-studio/config.toml"));
    }

    #[test]
    fn test_defaults_for_optional_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "store_path = \"/srv/runbooks\"\n");

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::new("/srv/runbooks"));
        assert_eq!(config.freshness(), Duration::from_secs(30 * 60));
        assert!(config.code_analysis);
    }

    #[test]
    fn test_all_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            "store_path = \"/srv/runbooks\"\nfreshness_minutes = 5\ncode_analysis = false\n",
        );

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.freshness_minutes, 5);
        assert!(!config.code_analysis);
    }

    #[test]
    fn test_missing_store_path_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(&temp_dir, "freshness_minutes = 5\n");

        let error = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(error, ConfigError::ConfigParseError { .. }));
        assert!(error.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        assert_eq!(Config::expand_path(&path).unwrap(), path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_creates_directory_and_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let mut config = Config::new("/tmp/runbooks");
        config.freshness_minutes = 10;

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_env_var_in_store_path() {
        unsafe {
            env::set_var("RUNBOOK_STUDIO_TEST_ROOT", "/custom/store");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = write_config(
            &temp_dir,
            "store_path = \"$RUNBOOK_STUDIO_TEST_ROOT/runbooks\"\n",
        );
        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config.store_path, PathBuf::from("/custom/store/runbooks"));

        unsafe {
            env::remove_var("RUNBOOK_STUDIO_TEST_ROOT");
        }
    }
}
