use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SnagError};
use crate::geometry::Viewport;
use crate::session::SessionConfig;
use crate::spawner::SpawnConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub session_secs: u32,
    pub capture_hold_ms: u64,
    pub capture_radius: f64,
    pub base_size: f64,
    pub size_jitter: f64,
    pub spawn_interval_ms: u64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_secs: 120,
            capture_hold_ms: 2000,
            capture_radius: 100.0,
            base_size: 80.0,
            size_jitter: 40.0,
            spawn_interval_ms: 2000,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(SnagError::Config(msg.to_string()));
        if self.session_secs == 0 {
            return invalid("session_secs must be positive");
        }
        if self.spawn_interval_ms == 0 {
            return invalid("spawn_interval_ms must be positive");
        }
        let dimensions = [
            self.capture_radius,
            self.base_size,
            self.size_jitter,
            self.viewport_width,
            self.viewport_height,
        ];
        if dimensions.iter().any(|v| !v.is_finite()) {
            return invalid("sizes, radius and viewport must be finite numbers");
        }
        if self.base_size <= 0.0 {
            return invalid("base_size must be positive");
        }
        if self.capture_radius < 0.0 || self.size_jitter < 0.0 {
            return invalid("capture_radius and size_jitter must not be negative");
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return invalid("viewport dimensions must be positive");
        }
        Ok(())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_limit_secs: self.session_secs,
            spawn_interval: Duration::from_millis(self.spawn_interval_ms),
            capture_hold: Duration::from_millis(self.capture_hold_ms),
            capture_radius: self.capture_radius,
            spawn: SpawnConfig {
                base_size: self.base_size,
                size_jitter: self.size_jitter,
            },
            viewport: Viewport::new(self.viewport_width, self.viewport_height),
            seed: self.seed,
            ..SessionConfig::default()
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "snag") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("snag_config.json")
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
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => log::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            session_secs: 60,
            capture_hold_ms: 1500,
            capture_radius: 80.0,
            base_size: 60.0,
            size_jitter: 10.0,
            spawn_interval_ms: 1000,
            viewport_width: 800.0,
            viewport_height: 600.0,
            seed: Some(7),
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), Config::default());

        fs::write(&path, b"{{{").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"session_secs": 30}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.session_secs, 30);
        assert_eq!(cfg.capture_hold_ms, 2000);
    }

    #[test]
    fn converts_to_session_config() {
        let cfg = Config {
            session_secs: 45,
            capture_hold_ms: 1200,
            ..Config::default()
        };
        let sc = cfg.session_config();
        assert_eq!(sc.duration_limit_secs, 45);
        assert_eq!(sc.capture_hold, Duration::from_millis(1200));
        assert_eq!(sc.clock_interval, Duration::from_secs(1));
        assert_eq!(sc.viewport, Viewport::new(1280.0, 720.0));
    }

    #[test]
    fn validation_rejects_zero_length_sessions() {
        let cfg = Config {
            session_secs: 0,
            ..Config::default()
        };
        assert_matches!(cfg.validate(), Err(SnagError::Config(_)));
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validation_rejects_non_finite_geometry() {
        let infinite_viewport = Config {
            viewport_width: f64::INFINITY,
            ..Config::default()
        };
        assert_matches!(infinite_viewport.validate(), Err(SnagError::Config(_)));

        let nan_size = Config {
            base_size: f64::NAN,
            ..Config::default()
        };
        assert_matches!(nan_size.validate(), Err(SnagError::Config(_)));

        let nan_radius = Config {
            capture_radius: f64::NAN,
            ..Config::default()
        };
        assert_matches!(nan_radius.validate(), Err(SnagError::Config(_)));

        let infinite_jitter = Config {
            size_jitter: f64::INFINITY,
            ..Config::default()
        };
        assert_matches!(infinite_jitter.validate(), Err(SnagError::Config(_)));
    }
}
