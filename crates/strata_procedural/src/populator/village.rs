//! Villages of small huts.
//!
//! A village claims the whole chunk: it sets [`flags::VILLAGE`] so later
//! populators in the same pass (lakes) keep out. Huts sit on a levelled
//! foundation and never overlap each other.

use rand::Rng;

use super::{flags, DecorationContext, Populator, PopulatorKind};
use crate::biome::BiomeType;
use crate::chunk::{Block, Chunk, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;

/// Hut footprint, walls included.
const HUT_SIZE: usize = 5;
/// Wall height above the floor.
const WALL_HEIGHT: usize = 3;
/// Deepest gap under a hut that the foundation fills.
const MAX_FOUNDATION: usize = 4;
/// Biomes villages are built in.
const VILLAGE_BIOMES: [BiomeType; 3] = [BiomeType::Plains, BiomeType::Desert, BiomeType::Savanna];

/// Materials of one hut.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Palette {
    floor: Block,
    wall: Block,
    corner: Block,
    roof: Block,
}

impl Palette {
    const fn for_biome(biome: BiomeType) -> Self {
        if biome.is_desert_family() {
            Self {
                floor: Block::SANDSTONE,
                wall: Block::SANDSTONE,
                corner: Block::SANDSTONE,
                roof: Block::SANDSTONE,
            }
        } else {
            Self {
                floor: Block::COBBLESTONE,
                wall: Block::PLANKS,
                corner: Block::LOG,
                roof: Block::PLANKS,
            }
        }
    }
}

/// Corner of a hut footprint; the hut covers `HUT_SIZE` blocks each way.
#[derive(Clone, Copy, Debug)]
struct Footprint {
    x0: usize,
    z0: usize,
}

impl Footprint {
    const fn overlaps(self, other: Self) -> bool {
        self.x0 < other.x0 + HUT_SIZE
            && other.x0 < self.x0 + HUT_SIZE
            && self.z0 < other.z0 + HUT_SIZE
            && other.z0 < self.z0 + HUT_SIZE
    }
}

/// Builds a village in one chunk out of `chance`.
#[derive(Clone, Debug)]
pub struct VillagePopulator {
    chance: u32,
    max_huts: u32,
}

impl VillagePopulator {
    /// Creates a village populator building in one chunk out of `chance`.
    #[must_use]
    pub fn new(chance: u32) -> Self {
        Self {
            chance: chance.max(1),
            max_huts: 3,
        }
    }

    /// Caps the huts per village.
    #[must_use]
    pub fn with_max_huts(mut self, max_huts: u32) -> Self {
        self.max_huts = max_huts.max(1);
        self
    }

    /// Whether villages are built in `biome`.
    #[must_use]
    pub fn accepts(biome: BiomeType) -> bool {
        VILLAGE_BIOMES.contains(&biome)
    }

    /// Floor level for a hut at `site`, or `None` when the ground is under
    /// water, below sea level or too uneven to level.
    fn floor_level(chunk: &Chunk, site: Footprint, sea_level: usize) -> Option<usize> {
        let cx = site.x0 + HUT_SIZE / 2;
        let cz = site.z0 + HUT_SIZE / 2;
        let floor = chunk.top_solid_or_liquid(cx, cz)?;
        if floor < sea_level || floor + WALL_HEIGHT + 2 >= CHUNK_HEIGHT {
            return None;
        }
        for x in site.x0..site.x0 + HUT_SIZE {
            for z in site.z0..site.z0 + HUT_SIZE {
                let ground = chunk.top_solid_or_liquid(x, z)?;
                if chunk.get_block(x, ground, z).is_liquid() || ground + MAX_FOUNDATION < floor {
                    return None;
                }
            }
        }
        Some(floor)
    }

    fn build(chunk: &mut Chunk, site: Footprint, floor: usize, palette: Palette) {
        let (x1, z1) = (site.x0 + HUT_SIZE - 1, site.z0 + HUT_SIZE - 1);
        let door_x = site.x0 + HUT_SIZE / 2;

        for x in site.x0..=x1 {
            for z in site.z0..=z1 {
                // Foundation down to the ground.
                let mut y = floor;
                while y > 0 && !chunk.get_block(x, y, z).is_solid() {
                    chunk.set_block(x, y, z, Block::COBBLESTONE);
                    y -= 1;
                }
                chunk.set_block(x, floor, z, palette.floor);

                let edge_x = x == site.x0 || x == x1;
                let edge_z = z == site.z0 || z == z1;
                for level in 1..=WALL_HEIGHT {
                    let block = if edge_x && edge_z {
                        palette.corner
                    } else if (edge_x || edge_z) && !(z == site.z0 && x == door_x && level < WALL_HEIGHT) {
                        palette.wall
                    } else {
                        Block::AIR
                    };
                    chunk.set_block(x, floor + level, z, block);
                }
                chunk.set_block(x, floor + WALL_HEIGHT + 1, z, palette.roof);
                chunk.set_block(x, floor + WALL_HEIGHT + 2, z, Block::AIR);
            }
        }
    }
}

impl Populator for VillagePopulator {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Village
    }

    fn name(&self) -> &str {
        "village"
    }

    fn chance(&self) -> Option<u32> {
        Some(self.chance)
    }

    fn populate(
        &self,
        world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        let biome = chunk.biome(CHUNK_SIZE / 2, CHUNK_SIZE / 2);
        if !Self::accepts(biome) || rng.gen_range(0..self.chance) != 0 {
            return Ok(());
        }

        let sea_level = world.sea_level.max(0) as usize;
        let palette = Palette::for_biome(biome);
        let huts = rng.gen_range(1..=self.max_huts);
        let mut placed: Vec<Footprint> = Vec::new();

        for _ in 0..huts * 4 {
            if placed.len() as u32 >= huts {
                break;
            }
            let site = Footprint {
                x0: rng.gen_range(0..=CHUNK_SIZE - HUT_SIZE),
                z0: rng.gen_range(0..=CHUNK_SIZE - HUT_SIZE),
            };
            if placed.iter().any(|other| other.overlaps(site)) {
                continue;
            }
            let Some(floor) = Self::floor_level(chunk, site, sea_level) else {
                continue;
            };
            Self::build(chunk, site, floor, palette);
            placed.push(site);
        }

        if !placed.is_empty() {
            ctx.set_flag(flags::VILLAGE);
            tracing::trace!(coord = %chunk.coord, huts = placed.len(), "village built");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populator::test_support::{flat_chunk, rng};

    fn village_on(biome: BiomeType, surface: usize, seed: u64) -> (Chunk, DecorationContext) {
        let mut chunk = flat_chunk(biome, surface, Block::GRASS);
        let mut ctx = DecorationContext::new();
        VillagePopulator::new(1)
            .populate(&WorldConfig::default(), &mut chunk, &mut rng(seed), &mut ctx)
            .expect("villages never fail");
        (chunk, ctx)
    }

    #[test]
    fn test_builds_huts_and_sets_flag() {
        let (chunk, ctx) = village_on(BiomeType::Plains, 70, 5);
        assert!(ctx.has_flag(flags::VILLAGE));
        let planks = chunk.blocks().count(Block::PLANKS);
        println!("plank blocks: {planks}");
        assert!(planks > 0);
        assert!(chunk.blocks().count(Block::LOG) >= 4 * WALL_HEIGHT, "four corner posts");
    }

    #[test]
    fn test_desert_huts_use_sandstone() {
        let before = flat_chunk(BiomeType::Desert, 70, Block::GRASS).blocks().count(Block::SANDSTONE);
        let (chunk, ctx) = village_on(BiomeType::Desert, 70, 5);
        assert!(ctx.has_flag(flags::VILLAGE));
        assert!(chunk.blocks().count(Block::SANDSTONE) > before);
        assert_eq!(chunk.blocks().count(Block::PLANKS), 0);
    }

    #[test]
    fn test_no_village_under_sea_level() {
        let (chunk, ctx) = village_on(BiomeType::Plains, 40, 5);
        assert!(!ctx.has_flag(flags::VILLAGE));
        assert_eq!(chunk.blocks().count(Block::PLANKS), 0);
    }

    #[test]
    fn test_other_biomes_skipped() {
        for biome in [BiomeType::Forest, BiomeType::Ocean, BiomeType::IcePlains] {
            let (_, ctx) = village_on(biome, 70, 5);
            assert!(!ctx.has_flag(flags::VILLAGE), "{biome:?}");
        }
    }

    #[test]
    fn test_huts_do_not_overlap() {
        let a = Footprint { x0: 0, z0: 0 };
        assert!(a.overlaps(Footprint { x0: 4, z0: 4 }));
        assert!(!a.overlaps(Footprint { x0: 5, z0: 0 }));
        assert!(!a.overlaps(Footprint { x0: 0, z0: 5 }));
    }

    #[test]
    fn test_chance_gates_building() {
        let village = VillagePopulator::new(1_000_000);
        assert_eq!(village.chance(), Some(1_000_000));
        let mut built = 0;
        for seed in 0..20 {
            let mut chunk = flat_chunk(BiomeType::Plains, 70, Block::GRASS);
            let mut ctx = DecorationContext::new();
            village
                .populate(&WorldConfig::default(), &mut chunk, &mut rng(seed), &mut ctx)
                .expect("villages never fail");
            built += usize::from(ctx.has_flag(flags::VILLAGE));
        }
        assert_eq!(built, 0);
    }
}
