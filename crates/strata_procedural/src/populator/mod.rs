//! # Populators
//!
//! Strategy objects that shape a chunk after its base terrain exists.
//!
//! - [`GenerationPopulator`]: runs during the generate phase over the raw
//!   [`BlockVolume`] (terrain, caves, ravines)
//! - [`Populator`]: runs during the decoration phase over an assembled
//!   [`Chunk`] (villages, trees, lakes, dungeons)
//!
//! Each strategy reports a kind tag so lists can be filtered without
//! runtime type inspection.
//!
//! ## Flags
//!
//! Decoration populators share a [`DecorationContext`] for the duration of
//! one chunk's decoration phase. A populator may set a flag (e.g.
//! [`flags::DUNGEON`]) that later populators in the same pass consult.

mod cave;
mod dead_bush;
mod dungeon;
mod fauna;
mod filtered;
mod forest;
mod lake;
mod ravine;
mod shrub;
mod snow;
mod village;

pub use cave::{CaveCarver, CaveConfig};
pub use dead_bush::DeadBushPopulator;
pub use dungeon::DungeonPopulator;
pub use fauna::FaunaPopulator;
pub use filtered::FilteredPopulator;
pub use forest::{ForestPopulator, TreeKind};
pub use lake::LakePopulator;
pub use ravine::{RavineCarver, RavineConfig};
pub use shrub::ShrubPopulator;
pub use snow::SnowPopulator;
pub use village::VillagePopulator;

use rand::Rng;

use crate::chunk::{BiomeArea, BlockVolume, Chunk, ChunkCoord, CHUNK_SIZE};
use crate::config::WorldConfig;
use crate::error::GenResult;
use crate::seeding::ChunkRng;
use crate::settings::ChunkBiomeSettings;

/// Well-known decoration flags.
pub mod flags {
    /// A village occupies the chunk.
    pub const VILLAGE: &str = "VILLAGE";
    /// A dungeon was placed.
    pub const DUNGEON: &str = "DUNGEON";
    /// A lake was placed.
    pub const LAKE: &str = "LAKE";
}

/// Kind tag of a generation populator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenerationPopulatorKind {
    /// Fills the raw terrain.
    Terrain,
    /// Carves caves.
    Caves,
    /// Cuts ravines.
    Ravines,
    /// Anything else.
    Custom,
}

/// Kind tag of a decoration populator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopulatorKind {
    /// Trees.
    Forest,
    /// Tall grass and similar plants.
    Shrub,
    /// Dead bushes.
    DeadBush,
    /// Water or lava lakes.
    Lake,
    /// Dungeons.
    Dungeon,
    /// Village huts.
    Village,
    /// Snow and ice.
    Snow,
    /// Creature spawns.
    Fauna,
    /// Condition-gated wrapper around another populator.
    Filtered,
    /// Anything else.
    Custom,
}

/// What a generation populator works on.
pub struct GenerationTarget<'a> {
    /// World settings.
    pub world: &'a WorldConfig,
    /// The chunk being generated.
    pub coord: ChunkCoord,
    /// Blocks being generated.
    pub volume: &'a mut BlockVolume,
    /// Biomes of the chunk, read-only.
    pub biomes: &'a BiomeArea,
    /// Settings of every biome in the chunk.
    pub settings: &'a ChunkBiomeSettings,
}

/// A strategy that mutates the raw block volume during generation.
pub trait GenerationPopulator: Send + Sync {
    /// Kind tag used for filtering.
    fn kind(&self) -> GenerationPopulatorKind;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Mutates the volume.
    ///
    /// # Errors
    ///
    /// A failure aborts generation of the chunk.
    fn populate(&self, target: &mut GenerationTarget<'_>, rng: &mut ChunkRng) -> GenResult<()>;
}

/// A strategy that adds features to an assembled chunk.
pub trait Populator: Send + Sync {
    /// Kind tag used for filtering.
    fn kind(&self) -> PopulatorKind;

    /// Name used in logs and decoration events.
    fn name(&self) -> &str;

    /// One placement per this many chunks on average, for populators that
    /// roll a per-chunk chance.
    fn chance(&self) -> Option<u32> {
        None
    }

    /// Adds features to `chunk`.
    ///
    /// Failing to find a spot is not an error; the populator just places
    /// nothing.
    ///
    /// # Errors
    ///
    /// A failure aborts the remaining populators of this chunk.
    fn populate(
        &self,
        world: &WorldConfig,
        chunk: &mut Chunk,
        rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()>;
}

/// Flags shared by the populators of one decoration phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecorationContext {
    flags: Vec<String>,
}

impl DecorationContext {
    /// An empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self { flags: Vec::new() }
    }

    /// Whether `flag` was set earlier in this pass.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Sets `flag`; setting it twice keeps one entry.
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        let flag = flag.into();
        if !self.has_flag(&flag) {
            self.flags.push(flag);
        }
    }

    /// Flags in the order they were first set.
    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Consumes the context.
    #[must_use]
    pub fn into_flags(self) -> Vec<String> {
        self.flags
    }
}

/// Picks a column inside the chunk, keeping `margin` blocks from each edge.
pub(crate) fn random_column(rng: &mut ChunkRng, margin: usize) -> (usize, usize) {
    let span = CHUNK_SIZE - 2 * margin;
    (margin + rng.gen_range(0..span), margin + rng.gen_range(0..span))
}

/// `base + rand(spread) - rand(spread)`, kept inside `0..limit`.
pub(crate) fn jitter(rng: &mut ChunkRng, base: usize, spread: i32, limit: usize) -> Option<usize> {
    let offset = rng.gen_range(0..spread) - rng.gen_range(0..spread);
    let value = base as i32 + offset;
    if value >= 0 && (value as usize) < limit {
        Some(value as usize)
    } else {
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_ordered_and_unique() {
        let mut ctx = DecorationContext::new();
        assert!(!ctx.has_flag(flags::DUNGEON));
        ctx.set_flag(flags::DUNGEON);
        ctx.set_flag(flags::LAKE);
        ctx.set_flag(flags::DUNGEON);
        assert!(ctx.has_flag(flags::DUNGEON));
        assert_eq!(ctx.flags(), &["DUNGEON".to_string(), "LAKE".to_string()]);
    }

    #[test]
    fn test_random_column_respects_margin() {
        let mut rng = test_support::rng(3);
        for _ in 0..500 {
            let (x, z) = random_column(&mut rng, 2);
            assert!((2..14).contains(&x) && (2..14).contains(&z));
        }
    }

    #[test]
    fn test_jitter_stays_in_limit() {
        let mut rng = test_support::rng(4);
        for _ in 0..500 {
            if let Some(v) = jitter(&mut rng, 0, 8, 16) {
                assert!(v < 16);
            }
        }
    }
}
