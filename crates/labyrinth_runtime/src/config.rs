//! # Run Configuration
//!
//! Everything tunable about a run, loaded once at startup from TOML.
//! Missing fields take their defaults.
//!
//! ```toml
//! seed = "practice"
//! tile_size = 16
//!
//! [window]
//! fade_delay_ms = 30000
//! destroy_margin = 2
//!
//! [progression]
//! rest_points = [14, 29]
//! ```

use labyrinth_procedural::{GenerationConfig, ProgressionTable};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::input::InputConfig;

/// Active-window retention tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Age after which a non-initial chunk starts fading.
    pub fade_delay_ms: u64,
    /// Time from fade start to destruction.
    pub fade_duration_ms: u64,
    /// Chunks this far behind the player are destroyed at once.
    pub destroy_margin: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            fade_delay_ms: 30_000,
            fade_duration_ms: 400,
            destroy_margin: 2,
        }
    }
}

/// Pathfinder limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Maximum tiles expanded per search.
    pub max_nodes: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self { max_nodes: 4096 }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Fixed seed base; random per run when absent.
    pub seed: Option<String>,
    /// Tile edge in world units.
    pub tile_size: i64,
    /// Window retention.
    pub window: WindowConfig,
    /// Input buffering.
    pub input: InputConfig,
    /// Pathfinder limits.
    pub pathfinder: PathfinderConfig,
    /// Generation retries.
    pub generation: GenerationConfig,
    /// Chunk progression.
    pub progression: ProgressionTable,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tile_size: 16,
            window: WindowConfig::default(),
            input: InputConfig::default(),
            pathfinder: PathfinderConfig::default(),
            generation: GenerationConfig::default(),
            progression: ProgressionTable::default(),
        }
    }
}

impl RunConfig {
    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tile_size <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "tile_size",
                reason: "must be positive",
            });
        }
        if self.window.destroy_margin == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.destroy_margin",
                reason: "must be at least 1",
            });
        }
        if self.input.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "input.capacity",
                reason: "must be at least 1",
            });
        }
        if self.pathfinder.max_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pathfinder.max_nodes",
                reason: "must be at least 1",
            });
        }
        self.progression.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labyrinth_procedural::ProgressionError;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(RunConfig::from_toml_str("").unwrap(), RunConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = RunConfig::from_toml_str(
            r#"
            seed = "practice"
            tile_size = 32

            [window]
            destroy_margin = 3

            [generation]
            max_attempts = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.seed.as_deref(), Some("practice"));
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.window.destroy_margin, 3);
        assert_eq!(config.window.fade_delay_ms, 30_000);
        assert_eq!(config.generation.max_attempts, 4);
        assert_eq!(config.input, InputConfig::default());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            RunConfig::from_toml_str("tile_size = 0"),
            Err(ConfigError::InvalidValue { field: "tile_size", .. })
        ));
        assert!(matches!(
            RunConfig::from_toml_str("[window]\ndestroy_margin = 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RunConfig::from_toml_str("tile_size = \"big\""),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            RunConfig::from_toml_str("[progression]\nstages = []"),
            Err(ConfigError::Progression(ProgressionError::EmptyTable))
        );
    }
}
