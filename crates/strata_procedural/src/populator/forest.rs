//! Tree placement.

use rand::Rng;

use super::{random_column, DecorationContext, Populator, PopulatorKind};
use crate::amount::{VariableAmount, WeightedTable};
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Kinds of tree the forest populator can grow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Round canopy, 4-6 blocks.
    Oak,
    /// Round canopy, 5-7 blocks.
    Birch,
    /// Conical canopy, 6-9 blocks.
    Spruce,
    /// Wide canopy, 7-11 blocks.
    Jungle,
}

impl TreeKind {
    /// Wood variant stored in log and leaf metadata.
    #[must_use]
    pub const fn wood_meta(self) -> u16 {
        match self {
            Self::Oak => 0,
            Self::Spruce => 1,
            Self::Birch => 2,
            Self::Jungle => 3,
        }
    }

    const fn trunk_range(self) -> (usize, usize) {
        match self {
            Self::Oak => (4, 7),
            Self::Birch => (5, 8),
            Self::Spruce => (6, 10),
            Self::Jungle => (7, 12),
        }
    }

    fn log(self) -> Block {
        Block::with_meta(Block::LOG.id, self.wood_meta())
    }

    fn leaves(self) -> Block {
        Block::with_meta(Block::LEAVES.id, self.wood_meta())
    }
}

/// Places `count` trees per chunk on grass or dirt.
#[derive(Clone, Debug)]
pub struct ForestPopulator {
    count: VariableAmount,
    trees: WeightedTable<TreeKind>,
}

impl ForestPopulator {
    /// Blocks kept clear of the chunk edge so canopies stay inside it.
    const EDGE_MARGIN: usize = 2;

    /// Creates a forest populator.
    #[must_use]
    pub fn new(count: VariableAmount, trees: WeightedTable<TreeKind>) -> Self {
        Self { count, trees }
    }

    /// Tree count distribution.
    #[must_use]
    pub fn count(&self) -> &VariableAmount {
        &self.count
    }

    /// Weighted tree kinds.
    #[must_use]
    pub fn trees(&self) -> &WeightedTable<TreeKind> {
        &self.trees
    }

    /// Grows a tree rooted on top of `(x, ground, z)`. Returns false if it
    /// doesn't fit.
    fn grow(chunk: &mut Chunk, rng: &mut ChunkRng, kind: TreeKind, x: usize, ground: usize, z: usize) -> bool {
        let soil = chunk.get_block(x, ground, z);
        if !soil.same_type(Block::GRASS) && !soil.same_type(Block::DIRT) {
            return false;
        }

        let (min, max) = kind.trunk_range();
        let height = rng.gen_range(min..max);
        let top = ground + height;
        if top + 2 >= CHUNK_HEIGHT {
            return false;
        }
        if (ground + 1..=top).any(|y| !chunk.get_block(x, y, z).is_air()) {
            return false;
        }

        match kind {
            TreeKind::Spruce => Self::spruce_canopy(chunk, kind, x, top, z, height),
            _ => Self::round_canopy(chunk, rng, kind, x, top, z),
        }

        chunk.set_block(x, ground, z, Block::DIRT);
        for y in ground + 1..top {
            chunk.set_block(x, y, z, kind.log());
        }
        true
    }

    fn round_canopy(chunk: &mut Chunk, rng: &mut ChunkRng, kind: TreeKind, x: usize, top: usize, z: usize) {
        for y in top - 3..=top {
            let radius: i32 = if y + 1 >= top { 1 } else { 2 };
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    // Drop some corners so canopies look less boxy.
                    let corner = dx.abs() == radius && dz.abs() == radius;
                    if corner && (y == top || rng.gen_range(0..2) == 0) {
                        continue;
                    }
                    let lx = (x as i32 + dx) as usize;
                    let lz = (z as i32 + dz) as usize;
                    if chunk.get_block(lx, y, lz).is_air() {
                        chunk.set_block(lx, y, lz, kind.leaves());
                    }
                }
            }
        }
    }

    fn spruce_canopy(chunk: &mut Chunk, kind: TreeKind, x: usize, top: usize, z: usize, height: usize) {
        let bottom = top - (height - 2).min(top);
        for y in bottom..=top {
            let from_top = top - y;
            let radius: i32 = match from_top {
                0 => 0,
                n if n % 2 == 1 => 1,
                _ => 2,
            };
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    if radius > 0 && dx.abs() == radius && dz.abs() == radius {
                        continue;
                    }
                    let lx = (x as i32 + dx) as usize;
                    let lz = (z as i32 + dz) as usize;
                    if chunk.get_block(lx, y, lz).is_air() {
                        chunk.set_block(lx, y, lz, kind.leaves());
                    }
                }
            }
        }
    }
}

impl Populator for ForestPopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Forest
    }

    fn name(&self) -> &str {
        "forest"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        let count = self.count.floored_amount(rng);
        for _ in 0..count.max(0) {
            let (x, z) = random_column(rng, Self::EDGE_MARGIN);
            let Some(kind) = self.trees.get(rng).copied() else {
                return Ok(());
            };
            if let Some(ground) = chunk.top_solid_or_liquid(x, z) {
                Self::grow(chunk, rng, kind, x, ground, z);
            }
        }
        Ok(())
    }
}
