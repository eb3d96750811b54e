//! Ravines: long, narrow and deep trenches.
//!
//! A ravine starts in one chunk out of `chance` and walks away from it for a
//! few dozen blocks, so every chunk replays the starts of its neighbours and
//! carves the part of each walk that crosses it. A walk depends only on the
//! world seed and its start chunk, which keeps the halves of a ravine that
//! spans two chunks aligned in any generation order.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GenerationPopulator, GenerationPopulatorKind, GenerationTarget};
use crate::chunk::{Block, BlockVolume, ChunkCoord, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::error::GenResult;
use crate::noise::WorldSeed;
use crate::seeding::{feature_rng, ChunkRng};

/// Rows at the bottom of the world that are never carved.
const FLOOR_BAND: usize = 5;

/// Ravine shape parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RavineConfig {
    /// One ravine start per this many chunks.
    pub chance: u32,
    /// Fewest steps of one walk.
    pub min_length: u32,
    /// Most steps of one walk.
    pub max_length: u32,
    /// Widest horizontal radius, reached half-way along the walk.
    pub max_radius: f64,
    /// Vertical radius as a multiple of the horizontal one.
    pub depth_ratio: f64,
}

impl Default for RavineConfig {
    fn default() -> Self {
        Self {
            chance: 50,
            min_length: 40,
            max_length: 80,
            max_radius: 3.0,
            depth_ratio: 3.0,
        }
    }
}

/// Cuts ravines into the raw volume.
#[derive(Clone, Debug)]
pub struct RavineCarver {
    seed: WorldSeed,
    config: RavineConfig,
}

/// A horizontal ellipse stretched into a tall ellipsoid.
#[derive(Clone, Copy, Debug)]
struct Slice {
    x: f64,
    y: f64,
    z: f64,
    radius: f64,
    half_depth: f64,
}

impl RavineCarver {
    const SEED_PURPOSE: u64 = 0x0DDB_A11;

    /// Creates a carver for the world `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed, config: RavineConfig) -> Self {
        Self { seed, config }
    }

    /// The ravine configuration.
    #[must_use]
    pub fn config(&self) -> &RavineConfig {
        &self.config
    }

    /// How many chunks away a start can still reach this chunk.
    #[must_use]
    pub fn reach(&self) -> i32 {
        let blocks = f64::from(self.config.max_length.max(1)) + self.config.max_radius.max(1.0) + 1.0;
        (blocks / CHUNK_SIZE as f64).ceil() as i32 + 1
    }

    /// The slices of the ravine starting in `origin`, empty when the chunk
    /// has no start.
    fn walk(&self, origin: ChunkCoord) -> Vec<Slice> {
        let mut rng = feature_rng(self.seed, origin, Self::SEED_PURPOSE);
        if rng.gen_range(0..self.config.chance.max(1)) != 0 {
            return Vec::new();
        }

        let mut x = f64::from(origin.world_x()) + rng.gen_range(0.0..CHUNK_SIZE as f64);
        let mut y: f64 = rng.gen_range(20.0..60.0);
        let mut z = f64::from(origin.world_z()) + rng.gen_range(0.0..CHUNK_SIZE as f64);
        let mut yaw: f64 = rng.gen_range(0.0..TAU);
        let mut pitch: f64 = rng.gen_range(-0.125..0.125);
        let mut turn = 0.0;

        let min_length = self.config.min_length.max(1);
        let length = rng.gen_range(min_length..=self.config.max_length.max(min_length));
        let peak = rng.gen_range(0.0..=(self.config.max_radius - 1.0).max(0.0));

        let mut slices = Vec::with_capacity(length as usize);
        for step in 0..length {
            let t = f64::from(step) / f64::from(length);
            let radius = 1.0 + (t * PI).sin() * peak;
            slices.push(Slice {
                x,
                y,
                z,
                radius,
                half_depth: radius * self.config.depth_ratio,
            });

            x += yaw.cos() * pitch.cos();
            y += pitch.sin();
            z += yaw.sin() * pitch.cos();
            pitch = pitch * 0.7 + rng.gen_range(-0.05..0.05);
            yaw += turn * 0.05;
            turn = turn * 0.5 + rng.gen_range(-1.0..1.0);
        }
        slices
    }

    /// Carves one slice into the chunk at `coord`; returns the cells cleared.
    fn carve(volume: &mut BlockVolume, coord: ChunkCoord, slice: &Slice) -> usize {
        let ox = f64::from(coord.world_x());
        let oz = f64::from(coord.world_z());
        let span = |center: f64, origin: f64| {
            let lo = (center - slice.radius - origin).floor().max(0.0);
            let hi = (center + slice.radius - origin).ceil().min(CHUNK_SIZE as f64 - 1.0);
            (lo as usize, hi)
        };
        let (x0, x1) = span(slice.x, ox);
        let (z0, z1) = span(slice.z, oz);
        if x1 < 0.0 || z1 < 0.0 || x0 as f64 > x1 || z0 as f64 > z1 {
            return 0;
        }

        let y0 = ((slice.y - slice.half_depth).floor().max(FLOOR_BAND as f64)) as usize;
        let y1 = ((slice.y + slice.half_depth).ceil().max(0.0) as usize).min(CHUNK_HEIGHT - 2);
        let mut carved = 0;

        for lx in x0..=x1 as usize {
            let dx = (ox + lx as f64 + 0.5 - slice.x) / slice.radius;
            for lz in z0..=z1 as usize {
                let dz = (oz + lz as f64 + 0.5 - slice.z) / slice.radius;
                let flat = dx * dx + dz * dz;
                if flat >= 1.0 || under_water(volume, lx, lz) {
                    continue;
                }
                for ly in y0..=y1 {
                    let dy = (ly as f64 + 0.5 - slice.y) / slice.half_depth;
                    if flat + dy * dy < 1.0 && volume.get(lx, ly, lz).is_solid() {
                        volume.set(lx, ly, lz, Block::AIR);
                        carved += 1;
                    }
                }
            }
        }
        carved
    }
}

/// Whether a liquid rests on the column's surface.
fn under_water(volume: &BlockVolume, x: usize, z: usize) -> bool {
    (0..CHUNK_HEIGHT - 1)
        .rev()
        .find(|&y| volume.get(x, y, z).is_solid())
        .is_some_and(|surface| volume.get(x, surface + 1, z).is_liquid())
}

impl GenerationPopulator for RavineCarver {
    fn kind(&self) -> GenerationPopulatorKind {
        GenerationPopulatorKind::Ravines
    }

    fn name(&self) -> &str {
        "ravines"
    }

    fn populate(&self, target: &mut GenerationTarget<'_>, _rng: &mut ChunkRng) -> GenResult<()> {
        let reach = self.reach();
        let mut carved = 0usize;
        for dz in -reach..=reach {
            for dx in -reach..=reach {
                let origin = ChunkCoord::new(target.coord.x + dx, target.coord.z + dz);
                for slice in self.walk(origin) {
                    carved += Self::carve(target.volume, target.coord, &slice);
                }
            }
        }
        tracing::trace!(coord = %target.coord, carved, "ravines carved");
        Ok(())
    }
}
