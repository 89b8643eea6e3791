//! Editor configuration.
//!
//! [`EditorConfig`] is plain data carried in the [`Context`](crate::context::Context).
//! It can be loaded from a JSON file; every field is optional and falls back
//! to its default.
//!
//! ```json
//! { "cull_distance": 120.0, "line_spacing": 2.0, "watch_files": false }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for the frame pipeline, ingestion and hot reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Entities farther than this from the camera lose [`Visible`](crate::components::Visible).
    pub cull_distance: f32,
    /// Vertical distance between consecutive lines of an ingested file.
    pub line_spacing: f32,
    /// Bounding sphere radius given to each phantom.
    pub phantom_radius: f32,
    /// Seconds between polling checks of tracked files.
    pub hot_reload_interval_secs: f32,
    /// Quiet time before a burst of watcher events counts as one change.
    pub debounce_millis: u64,
    pub fov_y_degrees: f32,
    pub aspect_ratio: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub pan_speed: f32,
    /// Restrict picking to entities carrying text.
    pub pick_phantoms_only: bool,
    /// Start a filesystem watcher for ingested files.
    pub watch_files: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cull_distance: 200.0,
            line_spacing: 1.5,
            phantom_radius: 0.5,
            hot_reload_interval_secs: 1.0,
            debounce_millis: 100,
            fov_y_degrees: 45.0,
            aspect_ratio: 1.5,
            zoom_min: 1.0,
            zoom_max: 100.0,
            zoom_step: 2.0,
            pan_speed: 0.01,
            pick_phantoms_only: true,
            watch_files: true,
        }
    }
}

impl EditorConfig {
    /// Load a config from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> String {
        // Serializing plain floats, ints and bools cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_millis)
    }

    pub fn hot_reload_interval(&self) -> Duration {
        Duration::from_secs_f32(self.hot_reload_interval_secs.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = EditorConfig::from_json(r#"{ "cull_distance": 50.0 }"#).unwrap();
        assert_eq!(config.cull_distance, 50.0);
        assert_eq!(config.line_spacing, 1.5);
        assert!(config.pick_phantoms_only);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = EditorConfig::from_json("{ cull_distance: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pevi.json");
        let mut config = EditorConfig::default();
        config.watch_files = false;
        config.debounce_millis = 250;
        std::fs::write(&path, config.to_json()).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
