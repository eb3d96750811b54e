//! # World Configuration
//!
//! Per-world settings loaded once at startup from TOML.
//!
//! ```toml
//! seed = 42
//! sea_level = 63
//!
//! [terrain]
//! base_height = 64.0
//!
//! [features]
//! water_lake_chance = 4
//! dungeons = false
//! ```
//!
//! Every field has a default, so an empty document is a valid world.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::{Block, CHUNK_HEIGHT};
use crate::error::{GenResult, GenerationError};
use crate::noise::WorldSeed;

/// Settings shared by every chunk of one world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: u64,
    /// Water surface height; columns below it fill with `filler_block`.
    pub sea_level: i32,
    /// Block below sea level where the density field is empty.
    pub filler_block: Block,
    /// Indestructible block of the bottom band.
    pub floor_block: Block,
    /// Density field shape.
    pub terrain: TerrainConfig,
    /// Default populator toggles.
    pub features: FeatureConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            sea_level: 63,
            filler_block: Block::WATER,
            floor_block: Block::BEDROCK,
            terrain: TerrainConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// The seed as a [`WorldSeed`].
    #[inline]
    #[must_use]
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed::new(self.seed)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] on syntax errors or
    /// out-of-range values.
    pub fn from_toml_str(text: &str) -> GenResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| GenerationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Io`] if the file can't be read, otherwise
    /// as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: &Path) -> GenResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> GenResult<String> {
        toml::to_string(self).map_err(|e| GenerationError::InvalidConfig(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> GenResult<()> {
        if self.sea_level < 1 || self.sea_level >= CHUNK_HEIGHT as i32 {
            return Err(GenerationError::InvalidConfig(format!(
                "sea_level must be in 1..{CHUNK_HEIGHT}, got {}",
                self.sea_level
            )));
        }
        if self.features.water_lake_chance < 1 {
            return Err(GenerationError::InvalidConfig(
                "features.water_lake_chance must be at least 1".into(),
            ));
        }
        if self.features.village_chance < 1 {
            return Err(GenerationError::InvalidConfig(
                "features.village_chance must be at least 1".into(),
            ));
        }
        self.terrain.validate()
    }
}

/// Shape of the density field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Surface height of a biome with `min_height = 0`.
    pub base_height: f64,
    /// Blocks per unit of biome `min_height`/`max_height`.
    pub height_variation: f64,
    /// Hill amplitude in blocks before biome variation is added.
    pub hill_amplitude: f64,
    /// Horizontal noise frequency.
    pub density_scale: f64,
    /// Vertical noise frequency.
    pub vertical_scale: f64,
    /// Blocks over which density falls off by one unit.
    pub squash: f64,
    /// Frequency of the ground-cover depth noise.
    pub cover_noise_scale: f64,
    /// Octaves of the density noise.
    pub octaves: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            base_height: 64.0,
            height_variation: 32.0,
            hill_amplitude: 12.0,
            density_scale: 1.0 / 96.0,
            vertical_scale: 1.0 / 48.0,
            squash: 8.0,
            cover_noise_scale: 0.0625,
            octaves: 4,
        }
    }
}

impl TerrainConfig {
    fn validate(&self) -> GenResult<()> {
        let fields = [
            ("base_height", self.base_height),
            ("height_variation", self.height_variation),
            ("hill_amplitude", self.hill_amplitude),
            ("density_scale", self.density_scale),
            ("vertical_scale", self.vertical_scale),
            ("squash", self.squash),
            ("cover_noise_scale", self.cover_noise_scale),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(GenerationError::InvalidConfig(format!(
                "terrain.{name} must be finite, got {value}"
            )));
        }
        if self.squash <= 0.0 {
            return Err(GenerationError::InvalidConfig(
                "terrain.squash must be positive".into(),
            ));
        }
        if self.octaves == 0 {
            return Err(GenerationError::InvalidConfig(
                "terrain.octaves must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Toggles for the default populators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Carve caves during generation.
    pub caves: bool,
    /// Cut ravines during generation.
    pub ravines: bool,
    /// Build villages. A village chunk gets no lakes.
    pub villages: bool,
    /// One village per this many chunks on average, in village biomes.
    pub village_chance: u32,
    /// Place water lakes.
    pub water_lakes: bool,
    /// One water lake per this many chunks on average.
    pub water_lake_chance: u32,
    /// Place lava lakes. They roll against `water_lake_chance` too.
    pub lava_lakes: bool,
    /// Place dungeons.
    pub dungeons: bool,
    /// Dungeon placement attempts per chunk.
    pub dungeon_attempts: u32,
    /// Record animal spawns.
    pub animals: bool,
    /// Snow and ice in frozen biomes.
    pub snow: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            caves: true,
            ravines: true,
            villages: true,
            village_chance: 32,
            water_lakes: true,
            water_lake_chance: 4,
            lava_lakes: true,
            dungeons: true,
            dungeon_attempts: 8,
            animals: true,
            snow: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = WorldConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.sea_level, 63);
    }

    #[test]
    fn test_partial_document() {
        let config = WorldConfig::from_toml_str(
            r#"
            seed = 42
            sea_level = 40

            [features]
            dungeons = false
            water_lake_chance = 10
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 42);
        assert_eq!(config.sea_level, 40);
        assert!(!config.features.dungeons);
        assert_eq!(config.features.water_lake_chance, 10);
        assert!(config.features.caves);
        assert_eq!(config.terrain, TerrainConfig::default());
    }

    #[test]
    fn test_custom_blocks() {
        let config = WorldConfig::from_toml_str(
            r#"
            filler_block = { id = 11 }
            "#,
        )
        .expect("valid config");
        assert_eq!(config.filler_block, Block::LAVA);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            WorldConfig::from_toml_str("sea_level = 0"),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("sea_level = 300"),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[features]\nwater_lake_chance = 0"),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("[features]\nvillage_chance = 0"),
            Err(GenerationError::InvalidConfig(_))
        ));
        assert!(matches!(
            WorldConfig::from_toml_str("seed = \"abc\""),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_terrain() {
        let err = WorldConfig::from_toml_str("[terrain]\nheight_variation = nan")
            .expect_err("NaN variation");
        assert!(err.to_string().contains("terrain.height_variation must be finite"));
        assert!(WorldConfig::from_toml_str("[terrain]\nsquash = inf").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = WorldConfig::with_seed(99);
        let text = config.to_toml_string().expect("serializable");
        assert_eq!(WorldConfig::from_toml_str(&text).expect("valid"), config);
    }
}
