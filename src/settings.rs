//! Runtime settings
//!
//! Read from a JSON file when one is given; every field has a default so a
//! partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::BACKYARD_SUNFLOWER;
use crate::error::ConfigError;

/// Endpoint that answers whether a newer version is out
pub const DEFAULT_UPDATE_ENDPOINT: &str =
    "https://n4jexxccj8.execute-api.us-east-2.amazonaws.com/default/UpdateAvailable";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory that asset paths are relative to
    pub asset_root: PathBuf,
    /// Feeder to start with
    pub feeder: String,
    /// Extra feeder context files to register
    pub extra_feeders: Vec<PathBuf>,

    // === Audio ===
    pub start_muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Update check ===
    pub check_for_updates: bool,
    pub update_endpoint: String,

    /// Fixed RNG seed; random when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("."),
            feeder: BACKYARD_SUNFLOWER.to_string(),
            extra_feeders: Vec::new(),

            start_muted: false,
            master_volume: 0.8,

            check_for_updates: true,
            update_endpoint: DEFAULT_UPDATE_ENDPOINT.to_string(),

            seed: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Settings from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Master volume clamped to 0.0 - 1.0
    pub fn volume(&self) -> f32 {
        self.master_volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "start_muted": true, "seed": 42 }"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.start_muted);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.feeder, BACKYARD_SUNFLOWER);
        assert_eq!(settings.update_endpoint, DEFAULT_UPDATE_ENDPOINT);
    }

    #[test]
    fn test_bad_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn test_volume_is_clamped() {
        let settings = Settings {
            master_volume: 3.0,
            ..Default::default()
        };
        assert_eq!(settings.volume(), 1.0);
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
