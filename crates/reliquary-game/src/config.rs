//! Tunables of the interaction core
//!
//! Every section falls back to its defaults, so a config file only needs
//! the values it changes:
//!
//! ```toml
//! [targeting]
//! ray_length = 3.0
//!
//! [inspection]
//! rotate_speed = 0.02
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use reliquary_core::TickConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::inspection::InspectionConfig;
use crate::player::MovementConfig;
use crate::targeting::TargetingConfig;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration of the whole core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub tick: TickConfig,
    pub targeting: TargetingConfig,
    pub inspection: InspectionConfig,
    pub movement: MovementConfig,
}

impl CoreConfig {
    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded core config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = CoreConfig::from_toml_str(
            r#"
            [targeting]
            ray_length = 4.0

            [inspection]
            zoom_speed = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.targeting.ray_length, 4.0);
        assert_eq!(config.targeting.layer_mask, TargetingConfig::default().layer_mask);
        assert_eq!(config.inspection.zoom_speed, 0.2);
        assert_eq!(
            config.inspection.base_distance,
            InspectionConfig::default().base_distance
        );
        assert_eq!(config.movement.walk_speed, MovementConfig::default().walk_speed);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config.tick.fixed_timestep, TickConfig::default().fixed_timestep);
    }

    #[test]
    fn test_serialized_config_parses() {
        let text = toml::to_string_pretty(&CoreConfig::default()).unwrap();
        let parsed = CoreConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.inspection.max_zoom_offset, 0.4);
    }

    #[test]
    fn test_invalid_config_reports_parse_error() {
        let err = CoreConfig::from_toml_str("[targeting]\nray_length = \"far\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CoreConfig::load(Path::new("/nonexistent/reliquary.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
