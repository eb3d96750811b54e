//! # Biome Registry
//!
//! Supplies the default [`BiomeGenerationSettings`] of every biome type. The
//! world generator asks the registry once per biome, the first time a chunk
//! containing that biome is generated, and caches the answer for the life of
//! the world.

use std::sync::Arc;

use crate::amount::{SeededAmount, VariableAmount, WeightedTable};
use crate::biome::BiomeType;
use crate::chunk::Block;
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::populator::{DeadBushPopulator, ForestPopulator, ShrubPopulator, TreeKind};
use crate::settings::{BiomeGenerationSettings, BlockSelector, GroundCoverLayer, SharedPopulator};

/// Source of default per-biome settings.
pub trait BiomeRegistry: Send + Sync {
    /// Builds the default settings of `biome` for `world`.
    ///
    /// # Errors
    ///
    /// Returns an error when the settings fail validation.
    fn init_settings(
        &self,
        biome: BiomeType,
        world: &WorldConfig,
    ) -> GenResult<BiomeGenerationSettings>;
}

/// Vanilla-flavoured defaults for every [`BiomeType`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultBiomeRegistry;

impl DefaultBiomeRegistry {
    /// Creates the registry.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// `(min_height, max_height)` of a biome.
    #[must_use]
    pub const fn heights(biome: BiomeType) -> (f32, f32) {
        match biome {
            BiomeType::Ocean | BiomeType::FrozenOcean => (-1.0, -0.9),
            BiomeType::DeepOcean => (-1.8, -1.7),
            BiomeType::River => (-0.5, -0.4),
            BiomeType::Beach => (0.0, 0.05),
            BiomeType::Swampland => (-0.2, 0.1),
            BiomeType::Plains | BiomeType::Desert | BiomeType::IcePlains => (0.1, 0.2),
            BiomeType::Savanna => (0.125, 0.2),
            BiomeType::Forest | BiomeType::BirchForest | BiomeType::Mesa => (0.1, 0.3),
            BiomeType::Jungle => (0.1, 0.4),
            BiomeType::Taiga | BiomeType::ColdTaiga => (0.2, 0.4),
            BiomeType::DesertHills => (0.45, 0.75),
            BiomeType::ExtremeHills => (1.0, 1.5),
        }
    }

    fn ground_cover(biome: BiomeType) -> Vec<GroundCoverLayer> {
        let filler = SeededAmount::filler_depth();
        match biome {
            BiomeType::Desert | BiomeType::DesertHills | BiomeType::Beach => vec![
                GroundCoverLayer::top(Block::SAND),
                GroundCoverLayer::new(Block::SAND, filler),
                GroundCoverLayer::new(Block::SANDSTONE, SeededAmount::fixed(2.0)),
            ],
            BiomeType::Ocean | BiomeType::DeepOcean | BiomeType::FrozenOcean | BiomeType::River => vec![
                GroundCoverLayer::top(Block::GRAVEL),
                GroundCoverLayer::new(Block::DIRT, filler),
            ],
            BiomeType::Mesa => vec![
                GroundCoverLayer::new(
                    BlockSelector::NoiseThreshold {
                        threshold: 1.0,
                        above: Block::HARDENED_CLAY,
                        below: Block::SAND,
                    },
                    SeededAmount::fixed(1.0),
                ),
                GroundCoverLayer::new(Block::HARDENED_CLAY, filler),
            ],
            BiomeType::ExtremeHills => vec![
                GroundCoverLayer::new(
                    BlockSelector::NoiseThreshold {
                        threshold: 1.0,
                        above: Block::STONE,
                        below: Block::GRASS,
                    },
                    SeededAmount::fixed(1.0),
                ),
                GroundCoverLayer::new(Block::DIRT, filler),
            ],
            _ => vec![
                GroundCoverLayer::top(Block::GRASS),
                GroundCoverLayer::new(Block::DIRT, filler),
            ],
        }
    }

    fn populators(biome: BiomeType) -> Vec<SharedPopulator> {
        let mut populators: Vec<SharedPopulator> = Vec::new();

        if let Some((count, trees)) = Self::forest(biome) {
            populators.push(Arc::new(ForestPopulator::new(count, trees)));
        }

        let grass = match biome {
            BiomeType::Plains | BiomeType::Savanna => Some(VariableAmount::range(128.0, 384.0)),
            BiomeType::Jungle => Some(VariableAmount::fixed(384.0)),
            BiomeType::Forest
            | BiomeType::BirchForest
            | BiomeType::Taiga
            | BiomeType::ColdTaiga
            | BiomeType::Swampland
            | BiomeType::ExtremeHills
            | BiomeType::IcePlains => Some(VariableAmount::fixed(128.0)),
            _ => None,
        };
        if let Some(count) = grass {
            populators.push(Arc::new(ShrubPopulator::new(count)));
        }

        match biome {
            BiomeType::Desert | BiomeType::DesertHills => {
                populators.push(Arc::new(DeadBushPopulator::new(VariableAmount::fixed(32.0))));
            }
            BiomeType::Mesa | BiomeType::Savanna => {
                populators.push(Arc::new(DeadBushPopulator::new(VariableAmount::fixed(16.0))));
            }
            _ => {}
        }
        populators
    }

    fn forest(biome: BiomeType) -> Option<(VariableAmount, WeightedTable<TreeKind>)> {
        let oak_and_birch = || {
            WeightedTable::new()
                .with(TreeKind::Oak, 4.0)
                .with(TreeKind::Birch, 1.0)
        };
        let forest = match biome {
            BiomeType::Forest => (VariableAmount::base_with_random_addition(6, 4), oak_and_birch()),
            BiomeType::BirchForest => (
                VariableAmount::base_with_random_addition(6, 4),
                WeightedTable::new().with(TreeKind::Birch, 1.0),
            ),
            BiomeType::Taiga | BiomeType::ColdTaiga => (
                VariableAmount::base_with_random_addition(5, 4),
                WeightedTable::new().with(TreeKind::Spruce, 1.0),
            ),
            BiomeType::Jungle => (
                VariableAmount::base_with_random_addition(8, 4),
                WeightedTable::new()
                    .with(TreeKind::Jungle, 3.0)
                    .with(TreeKind::Oak, 1.0),
            ),
            BiomeType::Swampland => (VariableAmount::fixed(2.0), WeightedTable::new().with(TreeKind::Oak, 1.0)),
            BiomeType::ExtremeHills => (
                VariableAmount::base_with_optional_addition(0, 2, 0.5),
                WeightedTable::new()
                    .with(TreeKind::Spruce, 2.0)
                    .with(TreeKind::Oak, 1.0),
            ),
            BiomeType::Plains | BiomeType::Savanna | BiomeType::IcePlains => (
                VariableAmount::base_with_optional_addition(0, 1, 0.1),
                oak_and_birch(),
            ),
            _ => return None,
        };
        Some(forest)
    }
}

impl BiomeRegistry for DefaultBiomeRegistry {
    fn init_settings(
        &self,
        biome: BiomeType,
        _world: &WorldConfig,
    ) -> GenResult<BiomeGenerationSettings> {
        let (min, max) = Self::heights(biome);
        BiomeGenerationSettings::builder()
            .min_height(min)
            .max_height(max)
            .ground_cover_layers(&Self::ground_cover(biome))
            .generation_populators(&[])
            .populators(&Self::populators(biome))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populator::PopulatorKind;

    #[test]
    fn test_every_biome_has_valid_settings() {
        let registry = DefaultBiomeRegistry::new();
        let world = WorldConfig::default();
        for biome in BiomeType::ALL {
            let settings = registry
                .init_settings(biome, &world)
                .unwrap_or_else(|e| panic!("{biome}: {e}"));
            assert!(settings.min_height() <= settings.max_height(), "{biome}");
            assert!(!settings.ground_cover_layers().is_empty(), "{biome}");
        }
    }

    #[test]
    fn test_oceans_sit_below_sea_level() {
        let (min, _) = DefaultBiomeRegistry::heights(BiomeType::Ocean);
        assert!(min < 0.0);
        let (hills, _) = DefaultBiomeRegistry::heights(BiomeType::ExtremeHills);
        assert!(hills > DefaultBiomeRegistry::heights(BiomeType::Plains).1);
    }

    #[test]
    fn test_deserts_get_dead_bushes_not_trees() {
        let settings = DefaultBiomeRegistry::new()
            .init_settings(BiomeType::Desert, &WorldConfig::default())
            .expect("valid settings");
        let kinds: Vec<_> = settings.populators().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![PopulatorKind::DeadBush]);
        assert_eq!(settings.ground_cover_layers()[0].selector.select(0.0), Block::SAND);
    }

    #[test]
    fn test_forest_populators_in_order() {
        let settings = DefaultBiomeRegistry::new()
            .init_settings(BiomeType::Forest, &WorldConfig::default())
            .expect("valid settings");
        let kinds: Vec<_> = settings.populators().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![PopulatorKind::Forest, PopulatorKind::Shrub]);
    }

    #[test]
    fn test_mesa_top_follows_noise() {
        let layers = DefaultBiomeRegistry::ground_cover(BiomeType::Mesa);
        assert_eq!(layers[0].selector.select(2.0), Block::HARDENED_CLAY);
        assert_eq!(layers[0].selector.select(-2.0), Block::SAND);
    }
}
