//! # Populator Factory
//!
//! Builds the standard populators from declarative parameters and wires the
//! world's feature toggles into a [`WorldGenerator`].

use std::sync::Arc;

use crate::amount::VariableAmount;
use crate::chunk::{Block, CHUNK_SIZE};
use crate::noise::WorldSeed;
use crate::populator::{
    flags, CaveCarver, CaveConfig, DungeonPopulator, FaunaPopulator, FilteredPopulator,
    LakePopulator, RavineCarver, RavineConfig, SnowPopulator, VillagePopulator,
};
use crate::world_generator::WorldGenerator;

/// Constructors for configured populators.
#[derive(Clone, Copy, Debug, Default)]
pub struct PopulatorFactory;

impl PopulatorFactory {
    /// A lake of `liquid`, one per `chance` chunks, searching down from
    /// `height`.
    #[must_use]
    pub fn lake(liquid: Block, chance: u32, height: VariableAmount) -> LakePopulator {
        LakePopulator::new(liquid, chance, height)
    }

    /// A water lake.
    #[must_use]
    pub fn water_lake(chance: u32, height: VariableAmount) -> LakePopulator {
        Self::lake(Block::WATER, chance, height)
    }

    /// A lava lake.
    #[must_use]
    pub fn lava_lake(chance: u32, height: VariableAmount) -> LakePopulator {
        Self::lake(Block::LAVA, chance, height)
    }

    /// A village builder, one village per `chance` chunks.
    #[must_use]
    pub fn village(chance: u32) -> VillagePopulator {
        VillagePopulator::new(chance)
    }

    /// A ravine carver with the default shape.
    #[must_use]
    pub fn ravines(seed: WorldSeed) -> RavineCarver {
        RavineCarver::new(seed, RavineConfig::default())
    }

    /// A dungeon placer making `attempts` tries per chunk.
    #[must_use]
    pub fn dungeon(attempts: u32) -> DungeonPopulator {
        DungeonPopulator::new(attempts)
    }

    /// Start height of water lakes: uniform over the world height.
    #[must_use]
    pub fn water_lake_height() -> VariableAmount {
        VariableAmount::base_with_random_addition(0, 256)
    }

    /// Start height of lava lakes: `rand(8 + rand(55 + optional 193))`,
    /// heavily biased toward the depths.
    #[must_use]
    pub fn lava_lake_height() -> VariableAmount {
        VariableAmount::base_with_random_addition(
            0,
            VariableAmount::base_with_random_addition(
                8,
                VariableAmount::base_with_optional_addition(55, 193, 0.1),
            ),
        )
    }
}

/// Appends the default global populators enabled in the world's
/// [`FeatureConfig`](crate::config::FeatureConfig).
///
/// Order: caves, ravines (generation); village, water lake, lava lake,
/// dungeon, fauna, snow (decoration). Lakes are skipped when a village
/// claimed the chunk; water lakes also skip desert-family biomes.
pub fn install_default_populators(generator: &mut WorldGenerator) {
    let config = generator.config().clone();
    let features = &config.features;

    if features.caves {
        generator
            .generation_populators_mut()
            .push(Arc::new(CaveCarver::new(config.world_seed(), CaveConfig::default())));
    }
    if features.ravines {
        generator
            .generation_populators_mut()
            .push(Arc::new(PopulatorFactory::ravines(config.world_seed())));
    }

    let populators = generator.populators_mut();
    if features.villages {
        populators.push(Arc::new(PopulatorFactory::village(features.village_chance)));
    }
    if features.water_lakes {
        let lake = PopulatorFactory::water_lake(features.water_lake_chance, PopulatorFactory::water_lake_height());
        populators.push(Arc::new(
            FilteredPopulator::new(Arc::new(lake))
                .with_predicate(|chunk| !chunk.biome(CHUNK_SIZE / 2, CHUNK_SIZE / 2).is_desert_family())
                .exclude_flag(flags::VILLAGE),
        ));
    }
    if features.lava_lakes {
        // Rolls against the water lake chance as well.
        let lake = PopulatorFactory::lava_lake(features.water_lake_chance, PopulatorFactory::lava_lake_height());
        populators.push(Arc::new(FilteredPopulator::new(Arc::new(lake)).exclude_flag(flags::VILLAGE)));
    }
    if features.dungeons {
        populators.push(Arc::new(PopulatorFactory::dungeon(features.dungeon_attempts)));
    }
    if features.animals {
        populators.push(Arc::new(FaunaPopulator::default()));
    }
    if features.snow {
        populators.push(Arc::new(SnowPopulator::new()));
    }
    tracing::debug!(
        generation = generator.generation_populators().len(),
        decoration = generator.populators().len(),
        "default populators installed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::populator::{GenerationPopulatorKind, Populator, PopulatorKind};
    use crate::seeding::ChunkRng;
    use rand::SeedableRng;

    #[test]
    fn test_defaults_install_everything_in_order() {
        let mut generator = WorldGenerator::new(WorldConfig::default());
        install_default_populators(&mut generator);

        assert_eq!(generator.generation_populators_of(GenerationPopulatorKind::Caves).len(), 1);
        assert_eq!(generator.generation_populators_of(GenerationPopulatorKind::Ravines).len(), 1);
        let names: Vec<_> = generator.generation_populators().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["caves", "ravines"]);

        let names: Vec<_> = generator.populators().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["village", "water_lake", "lava_lake", "dungeon", "fauna", "snow"]);
        assert_eq!(generator.populators_of(PopulatorKind::Filtered).len(), 2);
    }

    #[test]
    fn test_toggles_disable_populators() {
        let mut config = WorldConfig::default();
        config.features.caves = false;
        config.features.ravines = false;
        config.features.villages = false;
        config.features.lava_lakes = false;
        config.features.animals = false;
        let mut generator = WorldGenerator::new(config);
        install_default_populators(&mut generator);

        assert!(generator.generation_populators().is_empty());
        let names: Vec<_> = generator.populators().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["water_lake", "dungeon", "snow"]);
    }

    #[test]
    fn test_lava_lake_reuses_water_lake_chance() {
        let mut config = WorldConfig::default();
        config.features.water_lake_chance = 9;
        config.features.village_chance = 17;
        let mut generator = WorldGenerator::new(config);
        install_default_populators(&mut generator);

        let installed = |name: &str| {
            generator
                .populators()
                .iter()
                .find(|p| p.name() == name)
                .cloned()
                .unwrap_or_else(|| panic!("{name} installed"))
        };
        let lava = installed("lava_lake");
        assert_eq!(lava.kind(), PopulatorKind::Filtered);
        assert_eq!(lava.chance(), Some(9));
        assert_eq!(installed("water_lake").chance(), Some(9));
        assert_eq!(installed("village").chance(), Some(17));
        assert_eq!(installed("dungeon").chance(), None);

        // The wrapper reports its lake's chance.
        let filtered = FilteredPopulator::new(Arc::new(PopulatorFactory::lava_lake(9, VariableAmount::fixed(10.0))));
        assert_eq!(filtered.inner().kind(), PopulatorKind::Lake);
        assert_eq!(filtered.inner().chance(), filtered.chance());
    }

    #[test]
    fn test_lava_lake_places_lava() {
        let lava = PopulatorFactory::lava_lake(9, PopulatorFactory::lava_lake_height());
        assert_eq!(lava.liquid(), Block::LAVA);
        assert_eq!(lava.name(), "lava_lake");
    }

    #[test]
    fn test_lava_lake_height_biased_low() {
        let height = PopulatorFactory::lava_lake_height();
        let mut rng = ChunkRng::seed_from_u64(11);
        let samples: Vec<i32> = (0..2000).map(|_| height.floored_amount(&mut rng)).collect();
        let low = samples.iter().filter(|&&h| h < 63).count();
        assert!(samples.iter().all(|&h| (0..256).contains(&h)));
        assert!(low > samples.len() * 3 / 4, "{low} of {} below sea level", samples.len());
    }
}
