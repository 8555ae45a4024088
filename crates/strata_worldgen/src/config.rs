//! # Generator Configuration
//!
//! Every probability and radius used by the generation passes, plus the
//! worker pool and mob simulation settings. Loaded from TOML once at startup;
//! omitted keys keep their defaults.
//!
//! ```toml
//! seed = 12345
//! worker_count = 4
//! fudge_chance = 0.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::region::DEFAULT_SUB_REGION_SIZE;

use crate::error::{WorldGenError, WorldGenResult};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Base chance of decorating a freshly placed cell with an object.
pub const DEFAULT_OBJECT_CHANCE: f64 = 0.05;

/// Chance that a sub-region re-reads its surroundings for a new brush.
pub const DEFAULT_BRUSH_UPDATE_CHANCE: f64 = 0.5;

/// Chance that one fudge pass runs at all.
pub const DEFAULT_FUDGE_CHANCE: f64 = 0.35;

/// Chance that the hammer pass picks a random biome instead of the majority.
pub const DEFAULT_HAMMER_ANOMALY_CHANCE: f64 = 0.015;

/// Chance of spawning mobs on an eligible cell.
pub const DEFAULT_MOB_SPAWN_CHANCE: f64 = 0.025;

/// Width of one tile in pixels.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;

/// Tunables of the generation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root seed. `None` draws one at construction.
    pub seed: Option<u64>,
    /// Worker threads. 0 uses the available parallelism.
    pub worker_count: usize,
    /// Side of one sub-region (one task).
    pub sub_region_size: u32,
    /// Submit sub-regions in random order.
    pub shuffle_sub_regions: bool,
    /// Sampling stride of neighbourhood reports (1 = every cell).
    pub report_stride: u32,

    /// Base object chance, multiplied by the terrain's object frequency.
    pub object_chance: f64,
    /// Radius of the report read for terrain placement.
    pub placement_radius: u32,
    /// Chance per sub-region of refreshing the brush.
    pub brush_update_chance: f64,
    /// Radius of the report read around a sub-region midpoint for the brush.
    pub brush_radius: u32,

    /// Chance per invocation that a fudge pass runs.
    pub fudge_chance: f64,
    /// Radius of the fudge report.
    pub fudge_radius: u32,
    /// Chance that fudge rewrites the cell itself rather than its neighbours.
    pub fudge_self_chance: f64,

    /// Radius of the hammer report.
    pub hammer_radius: u32,
    /// Chance that hammer picks a random biome for the level.
    pub hammer_anomaly_chance: f64,

    /// Radius of the clean report.
    pub clean_radius: u32,
    /// A cell whose own biome count is at most this is rewritten by clean.
    pub clean_threshold: u32,

    /// Chance per passable uninitialized cell of spawning mobs.
    pub mob_spawn_chance: f64,
    /// Shortest random-walk interval of an animated mob (ms).
    pub mob_step_min_ms: u32,
    /// Longest random-walk interval of an animated mob (ms).
    pub mob_step_max_ms: u32,

    /// Width of one tile in pixels, used for movement offsets.
    pub tile_size: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            worker_count: 0,
            sub_region_size: DEFAULT_SUB_REGION_SIZE,
            shuffle_sub_regions: true,
            report_stride: 1,
            object_chance: DEFAULT_OBJECT_CHANCE,
            placement_radius: 1,
            brush_update_chance: DEFAULT_BRUSH_UPDATE_CHANCE,
            brush_radius: 5,
            fudge_chance: DEFAULT_FUDGE_CHANCE,
            fudge_radius: 2,
            fudge_self_chance: 0.5,
            hammer_radius: 3,
            hammer_anomaly_chance: DEFAULT_HAMMER_ANOMALY_CHANCE,
            clean_radius: 3,
            clean_threshold: 2,
            mob_spawn_chance: DEFAULT_MOB_SPAWN_CHANCE,
            mob_step_min_ms: 3000,
            mob_step_max_ms: 4000,
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl GeneratorConfig {
    /// Default configuration with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> WorldGenResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| WorldGenError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> WorldGenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WorldGenError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> WorldGenResult<()> {
        let chances = [
            ("object_chance", self.object_chance),
            ("brush_update_chance", self.brush_update_chance),
            ("fudge_chance", self.fudge_chance),
            ("fudge_self_chance", self.fudge_self_chance),
            ("hammer_anomaly_chance", self.hammer_anomaly_chance),
            ("mob_spawn_chance", self.mob_spawn_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{field} must be within 0..=1, got {value}")));
            }
        }

        if self.sub_region_size == 0 {
            return Err(invalid("sub_region_size must be positive".to_string()));
        }
        if self.report_stride == 0 {
            return Err(invalid("report_stride must be positive".to_string()));
        }
        if self.mob_step_min_ms == 0 || self.mob_step_min_ms > self.mob_step_max_ms {
            return Err(invalid(format!(
                "mob step interval {}..={} is empty",
                self.mob_step_min_ms, self.mob_step_max_ms
            )));
        }
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(invalid(format!("tile_size must be positive, got {}", self.tile_size)));
        }
        Ok(())
    }

    /// Worker threads to start, resolving 0 to the available parallelism.
    #[must_use]
    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count > 0 {
            return self.worker_count;
        }
        std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
    }
}

fn invalid(message: String) -> WorldGenError {
    WorldGenError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sub_region_size, 25);
        assert!((config.fudge_chance - 0.35).abs() < f64::EPSILON);
        assert!(config.resolved_worker_count() > 0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r"
            seed = 7
            worker_count = 2
            fudge_chance = 0.0
            ",
        )
        .unwrap();

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.resolved_worker_count(), 2);
        assert!(config.fudge_chance.abs() < f64::EPSILON);
        assert_eq!(config.hammer_radius, 3);
        assert_eq!(config.mob_step_max_ms, 4000);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = GeneratorConfig::from_toml_str("mob_spawn_chance = 1.5").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(msg) if msg.contains("mob_spawn_chance")));

        let err = GeneratorConfig::from_toml_str("mob_step_min_ms = 5000").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)));

        let err = GeneratorConfig::from_toml_str("sub_region_size = 0").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)));

        let err = GeneratorConfig::from_toml_str("tile_size = \"big\"").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)));
    }
}
