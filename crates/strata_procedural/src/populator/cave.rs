//! 3D noise cave carving.
//!
//! Swiss-cheese model: a cell becomes air where the octave noise falls at or
//! below a threshold. Carving keeps a shell of rock under the surface, never
//! touches the bedrock band and leaves the ground under shallow water alone
//! so oceans do not drain into the tunnels.

use serde::{Deserialize, Serialize};

use super::{GenerationPopulator, GenerationPopulatorKind, GenerationTarget};
use crate::chunk::{Block, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::error::GenResult;
use crate::noise::{OctavePerlin, WorldSeed};
use crate::seeding::ChunkRng;

/// Rows at the bottom of the world that are never carved.
const FLOOR_BAND: usize = 5;

/// Cave shape parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    /// Cells whose noise is at or below this value become air.
    pub threshold: f64,
    /// Spatial frequency of the cave noise.
    pub frequency: f64,
    /// Rows of rock kept under the surface.
    pub min_depth: usize,
    /// Rows of rock kept under a surface at or below sea level.
    pub ocean_floor_buffer: usize,
    /// Noise octaves.
    pub octaves: u32,
}

impl Default for CaveConfig {
    fn default() -> Self {
        Self {
            threshold: -0.25,
            frequency: 0.06,
            min_depth: 5,
            ocean_floor_buffer: 10,
            octaves: 3,
        }
    }
}

/// Carves caves into the raw volume.
pub struct CaveCarver {
    noise: OctavePerlin,
    config: CaveConfig,
}

impl CaveCarver {
    const SEED_PURPOSE: u64 = 0xCAFE_BABE;

    /// Creates a carver for the world `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed, config: CaveConfig) -> Self {
        let noise = OctavePerlin::new(seed.derive(Self::SEED_PURPOSE), config.octaves.max(1));
        Self { noise, config }
    }

    /// The cave configuration.
    #[must_use]
    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    /// Whether the block at world position (`x`, `y`, `z`) is carved, given
    /// the column's surface height and the world's sea level.
    #[must_use]
    pub fn is_cave(&self, x: i32, y: usize, z: i32, surface: usize, sea_level: usize) -> bool {
        if y < FLOOR_BAND || y >= surface {
            return false;
        }
        let depth = surface - y;
        if depth < self.config.min_depth {
            return false;
        }
        if surface <= sea_level && depth < self.config.ocean_floor_buffer {
            return false;
        }
        let f = self.config.frequency;
        let value = self.noise.sample(f64::from(x) * f, y as f64 * f, f64::from(z) * f);
        value <= self.config.threshold
    }
}

impl std::fmt::Debug for CaveCarver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaveCarver").field("config", &self.config).finish_non_exhaustive()
    }
}

impl GenerationPopulator for CaveCarver {
    fn kind(&self) -> GenerationPopulatorKind {
        GenerationPopulatorKind::Caves
    }

    fn name(&self) -> &str {
        "caves"
    }

    fn populate(&self, target: &mut GenerationTarget<'_>, _rng: &mut ChunkRng) -> GenResult<()> {
        let sea_level = target.world.sea_level.max(0) as usize;
        let origin_x = target.coord.world_x();
        let origin_z = target.coord.world_z();
        let mut carved = 0usize;

        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let Some(surface) = (0..CHUNK_HEIGHT).rev().find(|&y| target.volume.get(x, y, z).is_solid())
                else {
                    continue;
                };
                let wx = origin_x + x as i32;
                let wz = origin_z + z as i32;
                for y in FLOOR_BAND..surface {
                    if !target.volume.get(x, y, z).is_solid() {
                        continue;
                    }
                    if self.is_cave(wx, y, wz, surface, sea_level) {
                        target.volume.set(x, y, z, Block::AIR);
                        carved += 1;
                    }
                }
            }
        }
        tracing::trace!(coord = %target.coord, carved, "caves carved");
        Ok(())
    }
}
