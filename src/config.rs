//! Runtime configuration.
//!
//! Every field defaults to the matching constant, so a config file only
//! needs the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    BOSS_CATEGORIES, DEFAULT_MAX_BOSS_NUMBER, DEFAULT_MAX_DEFEATED_ENEMIES, POI_CATEGORIES,
    POI_INNER_RADIUS_M, POI_OUTER_RADIUS_M, SEARCH_RADIUS_KM, TRIGGER_DISTANCE_KM,
};

/// Failure to read a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File being read.
        path: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid configuration.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File being parsed.
        path: String,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Distances used by the proximity trigger engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProximityConfig {
    /// Distance at which a candidate counts as entered.
    pub trigger_distance_km: f64,
    /// Radius searched for regular candidates.
    pub search_radius_km: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            trigger_distance_km: TRIGGER_DISTANCE_KM,
            search_radius_km: SEARCH_RADIUS_KM,
        }
    }
}

/// Point-of-interest query and classification settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoiConfig {
    /// Features nearer than this to the origin are dropped.
    pub inner_radius_m: f64,
    /// Features farther than this from the origin are dropped.
    pub outer_radius_m: f64,
    /// Amenity categories requested from the service.
    pub categories: Vec<String>,
    /// Categories whose features become boss locations instead of
    /// regular ones.
    pub boss_categories: Vec<String>,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            inner_radius_m: POI_INNER_RADIUS_M,
            outer_radius_m: POI_OUTER_RADIUS_M,
            categories: POI_CATEGORIES.iter().map(|&c| c.to_owned()).collect(),
            boss_categories: BOSS_CATEGORIES.iter().map(|&c| c.to_owned()).collect(),
        }
    }
}

/// Thresholds applied to a freshly created progress ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressConfig {
    /// Regular wins that open the boss gate.
    pub max_defeated_enemies: u32,
    /// Highest reachable ladder index.
    pub max_boss_number: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            max_defeated_enemies: DEFAULT_MAX_DEFEATED_ENEMIES,
            max_boss_number: DEFAULT_MAX_BOSS_NUMBER,
        }
    }
}

/// All runtime settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Trigger engine distances.
    pub proximity: ProximityConfig,
    /// Point-of-interest query settings.
    pub poi: PoiConfig,
    /// Ledger thresholds.
    pub progress: ProgressConfig,
}

impl GameConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file is unreadable or not valid
    /// JSON for this structure.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"proximity": {{"triggerDistanceKm": 0.05}}}}"#).expect("write config");
        let config = GameConfig::load(file.path()).expect("config parses");
        assert_relative_eq!(config.proximity.trigger_distance_km, 0.05);
        assert_relative_eq!(config.proximity.search_radius_km, SEARCH_RADIUS_KM);
        assert_eq!(config.progress, ProgressConfig::default());
        assert_eq!(config.poi.boss_categories, vec!["place_of_worship".to_owned()]);
    }

    #[rstest]
    fn missing_file_is_a_read_error() {
        let err = GameConfig::load(Path::new("/definitely/not/here.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
