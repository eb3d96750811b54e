//! Water and lava lakes.
//!
//! A lake is a union of random ellipsoids inside a 16x8x16 box resting on the
//! terrain. The lower half of the shape is liquid and the upper half is air.
//! The whole lake is abandoned if its rim would leak: any liquid next to the
//! air half, or anything but solid ground or the lake's own liquid next to
//! the liquid half.

use rand::Rng;

use super::{flags, DecorationContext, Populator, PopulatorKind};
use crate::amount::VariableAmount;
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

const BOX_HEIGHT: usize = 8;
const LIQUID_LINE: usize = 4;

/// Places at most one lake per chunk.
#[derive(Clone, Debug)]
pub struct LakePopulator {
    liquid: Block,
    chance: u32,
    height: VariableAmount,
}

impl LakePopulator {
    /// Creates a lake populator placing `liquid` in one chunk out of
    /// `chance` on average, starting its search at `height`.
    #[must_use]
    pub fn new(liquid: Block, chance: u32, height: VariableAmount) -> Self {
        Self {
            liquid,
            chance: chance.max(1),
            height,
        }
    }

    /// The lake liquid.
    #[must_use]
    pub const fn liquid(&self) -> Block {
        self.liquid
    }

    /// One lake per this many chunks.
    #[must_use]
    pub const fn chance(&self) -> u32 {
        self.chance
    }

    fn shape(rng: &mut ChunkRng) -> Vec<bool> {
        let mut shape = vec![false; CHUNK_SIZE * CHUNK_SIZE * BOX_HEIGHT];
        let blobs = rng.gen_range(4..8);
        for _ in 0..blobs {
            let sx = rng.gen::<f64>() * 6.0 + 3.0;
            let sy = rng.gen::<f64>() * 4.0 + 2.0;
            let sz = rng.gen::<f64>() * 6.0 + 3.0;
            let cx = rng.gen::<f64>() * (16.0 - sx - 2.0) + 1.0 + sx / 2.0;
            let cy = rng.gen::<f64>() * (8.0 - sy - 4.0) + 2.0 + sy / 2.0;
            let cz = rng.gen::<f64>() * (16.0 - sz - 2.0) + 1.0 + sz / 2.0;

            for x in 1..CHUNK_SIZE - 1 {
                for z in 1..CHUNK_SIZE - 1 {
                    for y in 1..BOX_HEIGHT - 1 {
                        let dx = (x as f64 - cx) / (sx / 2.0);
                        let dy = (y as f64 - cy) / (sy / 2.0);
                        let dz = (z as f64 - cz) / (sz / 2.0);
                        if dx * dx + dy * dy + dz * dz < 1.0 {
                            shape[shape_index(x, y, z)] = true;
                        }
                    }
                }
            }
        }
        shape
    }

    fn leaks(&self, chunk: &Chunk, shape: &[bool], base: usize) -> bool {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 0..BOX_HEIGHT {
                    if shape[shape_index(x, y, z)] || !touches_shape(shape, x, y, z) {
                        continue;
                    }
                    let block = chunk.get_block(x, base + y, z);
                    if y >= LIQUID_LINE && block.is_liquid() {
                        return true;
                    }
                    if y < LIQUID_LINE && !block.is_solid() && !block.same_type(self.liquid) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[inline]
const fn shape_index(x: usize, y: usize, z: usize) -> usize {
    (x * CHUNK_SIZE + z) * BOX_HEIGHT + y
}

fn touches_shape(shape: &[bool], x: usize, y: usize, z: usize) -> bool {
    let at = |x: usize, y: usize, z: usize| shape[shape_index(x, y, z)];
    (x < CHUNK_SIZE - 1 && at(x + 1, y, z))
        || (x > 0 && at(x - 1, y, z))
        || (z < CHUNK_SIZE - 1 && at(x, y, z + 1))
        || (z > 0 && at(x, y, z - 1))
        || (y < BOX_HEIGHT - 1 && at(x, y + 1, z))
        || (y > 0 && at(x, y - 1, z))
}

impl Populator for LakePopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Lake
    }

    fn name(&self) -> &str {
        if self.liquid.same_type(Block::LAVA) {
            "lava_lake"
        } else {
            "water_lake"
        }
    }

    fn chance(&self) -> Option<u32> {
        Some(self.chance)
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        if rng.gen_range(0..self.chance) != 0 {
            return Ok(());
        }

        let x = rng.gen_range(0..CHUNK_SIZE);
        let z = rng.gen_range(0..CHUNK_SIZE);
        let start = self.height.floored_amount(rng);
        if start <= 0 {
            return Ok(());
        }
        let mut y = (start as usize).min(CHUNK_HEIGHT - 1);
        // Sink onto the terrain.
        while y > 5 && chunk.get_block(x, y, z).is_air() {
            y -= 1;
        }
        if y <= LIQUID_LINE {
            return Ok(());
        }
        let base = y - LIQUID_LINE;
        if base + BOX_HEIGHT > CHUNK_HEIGHT {
            return Ok(());
        }

        let shape = Self::shape(rng);
        if self.leaks(chunk, &shape, base) {
            tracing::trace!(coord = %chunk.coord, "lake rejected");
            return Ok(());
        }

        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 0..BOX_HEIGHT {
                    if shape[shape_index(x, y, z)] {
                        let block = if y < LIQUID_LINE { self.liquid } else { Block::AIR };
                        chunk.set_block(x, base + y, z, block);
                    }
                }
            }
        }
        ctx.set_flag(flags::LAKE);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeType;
    use crate::populator::test_support::{flat_chunk, rng};

    fn always(liquid: Block) -> LakePopulator {
        LakePopulator::new(liquid, 1, VariableAmount::fixed(120.0))
    }

    #[test]
    fn test_lake_in_solid_ground() {
        let mut chunk = flat_chunk(BiomeType::Plains, 80, Block::GRASS);
        let mut ctx = DecorationContext::new();
        always(Block::WATER)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(21), &mut ctx)
            .expect("lakes never fail");

        let water = chunk.blocks().count(Block::WATER);
        println!("water blocks: {water}");
        assert!(water > 0);
        assert!(ctx.has_flag(flags::LAKE));

        // Liquid never sits above the liquid line.
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 80..CHUNK_HEIGHT {
                    assert!(!chunk.get_block(x, y, z).is_liquid());
                }
            }
        }
    }

    #[test]
    fn test_lava_lake_places_lava() {
        let mut chunk = flat_chunk(BiomeType::Plains, 80, Block::GRASS);
        let mut ctx = DecorationContext::new();
        let lava = always(Block::LAVA);
        assert_eq!(lava.name(), "lava_lake");
        lava.populate(&WorldConfig::default(), &mut chunk, &mut rng(21), &mut ctx)
            .expect("lakes never fail");
        assert!(chunk.blocks().count(Block::LAVA) > 0);
        assert_eq!(chunk.blocks().count(Block::WATER), 0);
    }

    #[test]
    fn test_lake_rejected_next_to_other_liquid() {
        let mut chunk = flat_chunk(BiomeType::Plains, 80, Block::GRASS);
        // Flood the ground so every rim touches water.
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 60..=80 {
                    chunk.set_block(x, y, z, Block::WATER);
                }
                chunk.set_block(x, 80, z, Block::STONE);
            }
        }
        let before = chunk.blocks().count(Block::LAVA);
        let mut ctx = DecorationContext::new();
        always(Block::LAVA)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(21), &mut ctx)
            .expect("rejection is not an error");
        assert_eq!(chunk.blocks().count(Block::LAVA), before);
        assert!(!ctx.has_flag(flags::LAKE));
    }

    #[test]
    fn test_chance_gates_placement() {
        let lake = LakePopulator::new(Block::WATER, 1_000_000, VariableAmount::fixed(120.0));
        let mut placed = 0;
        for seed in 0..20 {
            let mut chunk = flat_chunk(BiomeType::Plains, 80, Block::GRASS);
            let mut ctx = DecorationContext::new();
            lake.populate(&WorldConfig::default(), &mut chunk, &mut rng(seed), &mut ctx)
                .expect("lakes never fail");
            placed += usize::from(ctx.has_flag(flags::LAKE));
        }
        assert_eq!(placed, 0);
    }
}
