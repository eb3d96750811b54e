//! Tall grass patches.

use super::{jitter, random_column, DecorationContext, Populator, PopulatorKind};
use crate::amount::VariableAmount;
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Scatters a plant over grass in patches.
///
/// `count` is the number of plants aimed for; every 128 of them make one
/// patch of up to 64 placement tries around a random column.
#[derive(Clone, Debug)]
pub struct ShrubPopulator {
    count: VariableAmount,
    plant: Block,
}

impl ShrubPopulator {
    const PLANTS_PER_PATCH: i32 = 128;
    const TRIES_PER_PATCH: usize = 64;

    /// Creates a tall grass populator.
    #[must_use]
    pub fn new(count: VariableAmount) -> Self {
        Self::with_plant(count, Block::TALL_GRASS)
    }

    /// Creates a populator for another plant.
    #[must_use]
    pub fn with_plant(count: VariableAmount, plant: Block) -> Self {
        Self { count, plant }
    }

    /// Plant count distribution.
    #[must_use]
    pub fn count(&self) -> &VariableAmount {
        &self.count
    }
}

impl Populator for ShrubPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Shrub
    }

    fn name(&self) -> &str {
        "shrub"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        let count = self.count.floored_amount(rng).max(0);
        let patches = (count + Self::PLANTS_PER_PATCH - 1) / Self::PLANTS_PER_PATCH;

        for _ in 0..patches {
            let (cx, cz) = random_column(rng, 0);
            let Some(ground) = chunk.top_solid_or_liquid(cx, cz) else {
                continue;
            };
            let cy = ground + 1;
            for _ in 0..Self::TRIES_PER_PATCH {
                let x = jitter(rng, cx, 8, CHUNK_SIZE);
                let y = jitter(rng, cy, 4, CHUNK_HEIGHT);
                let z = jitter(rng, cz, 8, CHUNK_SIZE);
                let (Some(x), Some(y), Some(z)) = (x, y, z) else {
                    continue;
                };
                if y == 0 {
                    continue;
                }
                if chunk.get_block(x, y, z).is_air()
                    && chunk.get_block(x, y - 1, z).same_type(Block::GRASS)
                {
                    chunk.set_block(x, y, z, self.plant);
                }
            }
        }
        Ok(())
    }
}
