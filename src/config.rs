use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::{SessionSettings, DEFAULT_REFRESH};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub selected_intervals: Vec<u32>,
    pub tick_rate_ms: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selected_intervals: Vec::new(),
            tick_rate_ms: DEFAULT_REFRESH.as_millis() as u64,
            seed: None,
        }
    }
}

impl Config {
    /// Refresh period, kept within 50..=250 ms.
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.clamp(50, 250))
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            refresh_interval: self.tick_rate(),
            seed: self.seed,
            ..SessionSettings::default()
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tartini") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("tartini_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files yield the defaults.
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
            tracing::warn!(path = %self.path.display(), "ignoring malformed config");
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
            selected_intervals: vec![3, 4, 105],
            tick_rate_ms: 200,
            seed: Some(99),
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{ "seed": 5 }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.seed, Some(5));
        assert_eq!(cfg.tick_rate_ms, 100);
        assert!(cfg.selected_intervals.is_empty());
    }

    #[test]
    fn tick_rate_is_clamped() {
        let cfg = Config {
            tick_rate_ms: 5,
            ..Config::default()
        };
        assert_eq!(cfg.tick_rate(), Duration::from_millis(50));
        assert_eq!(cfg.session_settings().refresh_interval, Duration::from_millis(50));
    }
}
