use crate::app_dirs::AppDirs;
use crate::error::Result;
use crate::session::{Mode, TestConfig, DEFAULT_TIME_LIMIT, DEFAULT_WORD_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted user preferences; validated into a `TestConfig` before use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub time_limit_secs: u64,
    pub word_count: usize,
    pub custom_text: Option<String>,
    pub save_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            time_limit_secs: DEFAULT_TIME_LIMIT,
            word_count: DEFAULT_WORD_COUNT,
            custom_text: None,
            save_results: true,
        }
    }
}

impl Config {
    pub fn to_test_config(&self) -> Result<TestConfig> {
        match self.mode {
            Mode::Time => TestConfig::time(self.time_limit_secs),
            Mode::Words => TestConfig::words(self.word_count),
            Mode::Quote => Ok(TestConfig::quote()),
            Mode::Custom => TestConfig::custom(self.custom_text.clone().unwrap_or_default()),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keyrush_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring invalid config at {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            mode: Mode::Custom,
            time_limit_secs: 120,
            word_count: 100,
            custom_text: Some("pack my box with five dozen liquor jugs".into()),
            save_results: false,
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_or_corrupt_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "mode": "words", "word_count": 50 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, Mode::Words);
        assert_eq!(cfg.word_count, 50);
        assert_eq!(cfg.time_limit_secs, DEFAULT_TIME_LIMIT);
    }

    #[test]
    fn to_test_config_validates() {
        let cfg = Config {
            time_limit_secs: 45,
            ..Default::default()
        };
        assert_matches!(cfg.to_test_config(), Err(Error::InvalidTimeLimit(45)));

        let custom = Config {
            mode: Mode::Custom,
            ..Default::default()
        };
        assert_matches!(custom.to_test_config(), Err(Error::EmptyCustomText));

        let quote = Config {
            mode: Mode::Quote,
            ..Default::default()
        };
        assert_eq!(quote.to_test_config().unwrap().mode(), Mode::Quote);
    }
}
