//! Underground dungeon rooms.

use rand::Rng;

use super::{flags, DecorationContext, Populator, PopulatorKind};
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Interior height of a room.
const ROOM_HEIGHT: usize = 3;

/// Tries to carve small cobblestone rooms with a spawner.
///
/// A spot qualifies when the floor and ceiling are fully solid and the walls
/// have between one and five openings at head height. Each success sets
/// [`flags::DUNGEON`].
#[derive(Clone, Debug)]
pub struct DungeonPopulator {
    attempts: u32,
}

impl DungeonPopulator {
    /// Creates a dungeon populator making `attempts` tries per chunk.
    #[must_use]
    pub const fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Tries per chunk.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    fn fits(chunk: &Chunk, x0: usize, x1: usize, y: usize, z0: usize, z1: usize) -> bool {
        let floor = y - 1;
        let ceiling = y + ROOM_HEIGHT;
        let mut openings = 0;

        for x in x0..=x1 {
            for z in z0..=z1 {
                if !chunk.get_block(x, floor, z).is_solid() || !chunk.get_block(x, ceiling, z).is_solid() {
                    return false;
                }
                let wall = x == x0 || x == x1 || z == z0 || z == z1;
                if wall && chunk.get_block(x, y, z).is_air() && chunk.get_block(x, y + 1, z).is_air() {
                    openings += 1;
                }
            }
        }
        (1..=5).contains(&openings)
    }

    fn carve(chunk: &mut Chunk, rng: &mut ChunkRng, x0: usize, x1: usize, y: usize, z0: usize, z1: usize) {
        let floor = y - 1;
        let ceiling = y + ROOM_HEIGHT;
        for x in x0..=x1 {
            for z in z0..=z1 {
                let wall = x == x0 || x == x1 || z == z0 || z == z1;
                for level in floor..=ceiling {
                    let existing = chunk.get_block(x, level, z);
                    if level == floor {
                        let block = if rng.gen_range(0..4) == 0 {
                            Block::COBBLESTONE
                        } else {
                            Block::MOSSY_COBBLESTONE
                        };
                        chunk.set_block(x, level, z, block);
                    } else if wall || level == ceiling {
                        if existing.is_solid() {
                            chunk.set_block(x, level, z, Block::COBBLESTONE);
                        }
                    } else {
                        chunk.set_block(x, level, z, Block::AIR);
                    }
                }
            }
        }
        chunk.set_block((x0 + x1) / 2, y, (z0 + z1) / 2, Block::MOB_SPAWNER);
    }
}

impl Populator for DungeonPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Dungeon
    }

    fn name(&self) -> &str {
        "dungeon"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        for _ in 0..self.attempts {
            let cx = rng.gen_range(4..12);
            let cz = rng.gen_range(4..12);
            let y = rng.gen_range(1..CHUNK_HEIGHT - ROOM_HEIGHT - 1);
            let rx = rng.gen_range(2..4);
            let rz = rng.gen_range(2..4);
            let (x0, x1) = (cx - rx - 1, cx + rx + 1);
            let (z0, z1) = (cz - rz - 1, cz + rz + 1);

            if Self::fits(chunk, x0, x1, y, z0, z1) {
                Self::carve(chunk, rng, x0, x1, y, z0, z1);
                ctx.set_flag(flags::DUNGEON);
                tracing::trace!(coord = %chunk.coord, y, "dungeon placed");
            }
        }
        Ok(())
    }
}
