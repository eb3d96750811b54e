//! Creature spawns recorded at decoration time.

use rand::Rng;

use super::{DecorationContext, Populator, PopulatorKind};
use crate::chunk::{Chunk, EntitySpawn, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// With probability `chance`, records a herd of one to four creatures of a
/// species native to the chunk's primary biome.
#[derive(Clone, Copy, Debug)]
pub struct FaunaPopulator {
    chance: f64,
}

impl FaunaPopulator {
    /// Default probability per chunk.
    pub const DEFAULT_CHANCE: f64 = 0.1;
    const MAX_HERD: usize = 4;

    /// Creates a fauna populator with the given per-chunk probability.
    #[must_use]
    pub const fn new(chance: f64) -> Self {
        Self { chance }
    }
}

impl Default for FaunaPopulator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHANCE)
    }
}

impl Populator for FaunaPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Fauna
    }

    fn name(&self) -> &str {
        "fauna"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        if rng.gen::<f64>() >= self.chance {
            return Ok(());
        }
        let species = chunk.biome(CHUNK_SIZE / 2, CHUNK_SIZE / 2).species();
        if species.is_empty() {
            return Ok(());
        }
        let kind = species[rng.gen_range(0..species.len())];
        let herd = rng.gen_range(1..=Self::MAX_HERD);
        let cx = rng.gen_range(0..CHUNK_SIZE) as i32;
        let cz = rng.gen_range(0..CHUNK_SIZE) as i32;

        for _ in 0..herd {
            let x = (cx + rng.gen_range(-2..=2)).clamp(0, CHUNK_SIZE as i32 - 1) as usize;
            let z = (cz + rng.gen_range(-2..=2)).clamp(0, CHUNK_SIZE as i32 - 1) as usize;
            let Some(ground) = chunk.top_solid_or_liquid(x, z) else {
                continue;
            };
            if !chunk.get_block(x, ground, z).is_solid() {
                continue;
            }
            let spawn = EntitySpawn {
                species: kind,
                x: f64::from(chunk.coord.world_x() + x as i32) + 0.5,
                y: (ground + 1) as f64,
                z: f64::from(chunk.coord.world_z() + z as i32) + 0.5,
            };
            chunk.add_entity_spawn(spawn);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeType;
    use crate::chunk::Block;
    use crate::populator::test_support::{flat_chunk, rng};

    #[test]
    fn test_herd_of_native_species() {
        let mut chunk = flat_chunk(BiomeType::Plains, 64, Block::GRASS);
        let mut ctx = DecorationContext::new();
        FaunaPopulator::new(1.0)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(8), &mut ctx)
            .expect("fauna never fails");

        let spawns = chunk.entity_spawns();
        assert!((1..=4).contains(&spawns.len()));
        let first = spawns[0].species;
        assert!(BiomeType::Plains.species().contains(&first));
        for spawn in spawns {
            assert_eq!(spawn.species, first, "one species per herd");
            assert!((spawn.y - 65.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_zero_chance_spawns_nothing() {
        let mut chunk = flat_chunk(BiomeType::Plains, 64, Block::GRASS);
        let mut ctx = DecorationContext::new();
        FaunaPopulator::new(0.0)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(8), &mut ctx)
            .expect("fauna never fails");
        assert!(chunk.entity_spawns().is_empty());
    }

    #[test]
    fn test_oceans_have_no_fauna() {
        let mut chunk = flat_chunk(BiomeType::Ocean, 40, Block::WATER);
        let mut ctx = DecorationContext::new();
        FaunaPopulator::new(1.0)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(8), &mut ctx)
            .expect("fauna never fails");
        assert!(chunk.entity_spawns().is_empty());
    }
}
