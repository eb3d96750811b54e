//! Snow cover and surface ice in frozen biomes.

use super::{DecorationContext, Populator, PopulatorKind};
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Freezes surface water and drops a snow layer on exposed ground in every
/// column whose biome is frozen.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnowPopulator;

impl SnowPopulator {
    /// Creates a snow populator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Populator for SnowPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Snow
    }

    fn name(&self) -> &str {
        "snow"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        _rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                if !chunk.biome(x, z).is_frozen() {
                    continue;
                }
                let Some(top) = chunk.top_solid_or_liquid(x, z) else {
                    continue;
                };
                let surface = chunk.get_block(x, top, z);
                if surface.same_type(Block::WATER) {
                    chunk.set_block(x, top, z, Block::ICE);
                } else if surface.is_solid()
                    && !surface.same_type(Block::ICE)
                    && top + 1 < CHUNK_HEIGHT
                    && chunk.get_block(x, top + 1, z).is_air()
                {
                    chunk.set_block(x, top + 1, z, Block::SNOW_LAYER);
                }
            }
        }
        Ok(())
    }
}
