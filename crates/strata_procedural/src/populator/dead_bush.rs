//! Dead bushes on sand and clay.

use super::{jitter, random_column, DecorationContext, Populator, PopulatorKind};
use crate::amount::VariableAmount;
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Places dead bushes: one attempt per 16 of `count`, four nearby tries each.
#[derive(Clone, Debug)]
pub struct DeadBushPopulator {
    count: VariableAmount,
}

impl DeadBushPopulator {
    const BUSHES_PER_ATTEMPT: i32 = 16;
    const TRIES_PER_ATTEMPT: usize = 4;

    /// Creates a dead bush populator.
    #[must_use]
    pub fn new(count: VariableAmount) -> Self {
        Self { count }
    }

    fn can_stand_on(block: Block) -> bool {
        block.same_type(Block::SAND) || block.same_type(Block::HARDENED_CLAY) || block.same_type(Block::DIRT)
    }
}

impl Populator for DeadBushPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::DeadBush
    }

    fn name(&self) -> &str {
        "dead_bush"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        let count = self.count.floored_amount(rng).max(0);
        let attempts = (count + Self::BUSHES_PER_ATTEMPT - 1) / Self::BUSHES_PER_ATTEMPT;

        for _ in 0..attempts {
            let (cx, cz) = random_column(rng, 0);
            let Some(ground) = chunk.top_solid_or_liquid(cx, cz) else {
                continue;
            };
            let cy = ground + 1;
            for _ in 0..Self::TRIES_PER_ATTEMPT {
                let pos = (
                    jitter(rng, cx, 8, CHUNK_SIZE),
                    jitter(rng, cy, 4, CHUNK_HEIGHT),
                    jitter(rng, cz, 8, CHUNK_SIZE),
                );
                let (Some(x), Some(y), Some(z)) = pos else {
                    continue;
                };
                if y > 0
                    && chunk.get_block(x, y, z).is_air()
                    && Self::can_stand_on(chunk.get_block(x, y - 1, z))
                {
                    chunk.set_block(x, y, z, Block::DEAD_BUSH);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeType;
    use crate::populator::test_support::{flat_chunk, rng};

    #[test]
    fn test_bushes_on_sand() {
        let mut chunk = flat_chunk(BiomeType::Desert, 70, Block::SAND);
        let mut ctx = DecorationContext::new();
        DeadBushPopulator::new(VariableAmount::fixed(160.0))
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(11), &mut ctx)
            .expect("bushes never fail");
        let placed = chunk.blocks().count(Block::DEAD_BUSH);
        println!("dead bushes: {placed}");
        assert!(placed > 0);
        assert!(placed <= 10, "at most one bush per attempt");
    }

    #[test]
    fn test_no_bushes_on_stone() {
        let mut chunk = flat_chunk(BiomeType::Desert, 70, Block::STONE);
        let mut ctx = DecorationContext::new();
        DeadBushPopulator::new(VariableAmount::fixed(160.0))
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(11), &mut ctx)
            .expect("bushes never fail");
        assert_eq!(chunk.blocks().count(Block::DEAD_BUSH), 0);
    }
}
