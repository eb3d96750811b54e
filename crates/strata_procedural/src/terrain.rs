//! # Base Terrain
//!
//! Turns a seed into raw chunk blocks in two steps:
//!
//! 1. [`NoiseTerrainGenerator`] samples a coarse 5x5x33 density lattice
//!    ([`DensityField`]) and trilinearly interpolates it over the chunk.
//!    Positive density is stone; the rest is the world's filler block below
//!    sea level and air above it.
//! 2. [`GroundCoverPass`] walks each column top-down and replaces the upper
//!    stone of every solid span with the biome's ground-cover layers, then
//!    lays the bedrock band.
//!
//! Both steps are pure functions of the world seed, the chunk coordinate and
//! the biome settings, so a chunk always comes out the same.

use rand::Rng;

use crate::chunk::{BiomeArea, Block, BlockVolume, ChunkCoord, CHUNK_HEIGHT, CHUNK_SIZE};
use crate::config::{TerrainConfig, WorldConfig};
use crate::error::GenResult;
use crate::noise::{OctavePerlin, SimplexNoise, WorldSeed};
use crate::populator::{GenerationPopulator, GenerationPopulatorKind, GenerationTarget};
use crate::seeding::ChunkRng;
use crate::settings::{BiomeGenerationSettingsBuilder, ChunkBiomeSettings, GroundCoverLayer};

/// Lattice points along x and z.
pub const LATTICE_XZ: usize = 5;
/// Lattice points along y.
pub const LATTICE_Y: usize = 33;
/// Blocks between lattice points along x and z.
const CELL_XZ: usize = 4;
/// Blocks between lattice points along y.
const CELL_Y: usize = 8;
/// Rows at the bottom that may become floor block.
const FLOOR_BAND: usize = 5;

/// Biome height bounds at each lattice column, `(min_height, max_height)`,
/// indexed `lx * 5 + lz`.
pub type LatticeHeights = [(f32, f32); LATTICE_XZ * LATTICE_XZ];

/// Index of a lattice point in the array returned by [`DensityField::sample`].
#[inline]
#[must_use]
pub const fn lattice_index(lx: usize, ly: usize, lz: usize) -> usize {
    (lx * LATTICE_XZ + lz) * LATTICE_Y + ly
}

/// Seeded 3D density over the world.
pub struct DensityField {
    noise: OctavePerlin,
    config: TerrainConfig,
}

impl DensityField {
    const SEED_PURPOSE: u64 = 0xDE25_1770;

    /// Creates the density field of a world.
    #[must_use]
    pub fn new(seed: WorldSeed, config: &TerrainConfig) -> Self {
        Self {
            noise: OctavePerlin::new(seed.derive(Self::SEED_PURPOSE), config.octaves.max(1)),
            config: config.clone(),
        }
    }

    /// Samples the density lattice of one chunk.
    ///
    /// Lattice point `(lx, ly, lz)` sits at block
    /// `(world_x + 4 * lx, 8 * ly, world_z + 4 * lz)`. The biome heights
    /// centre the surface and widen or narrow the hills.
    #[must_use]
    pub fn sample(&self, coord: ChunkCoord, heights: &LatticeHeights) -> Vec<f64> {
        let cfg = &self.config;
        let mut lattice = vec![0.0; LATTICE_XZ * LATTICE_XZ * LATTICE_Y];

        for lx in 0..LATTICE_XZ {
            for lz in 0..LATTICE_XZ {
                let (min, max) = heights[lx * LATTICE_XZ + lz];
                let center = cfg.base_height + f64::from(min) * cfg.height_variation;
                let spread = cfg.hill_amplitude + f64::from(max - min) * cfg.height_variation;
                let bx = f64::from(coord.world_x() + (lx * CELL_XZ) as i32);
                let bz = f64::from(coord.world_z() + (lz * CELL_XZ) as i32);

                for ly in 0..LATTICE_Y {
                    let by = (ly * CELL_Y) as f64;
                    let noise = self.noise.sample(
                        bx * cfg.density_scale,
                        by * cfg.vertical_scale,
                        bz * cfg.density_scale,
                    );
                    lattice[lattice_index(lx, ly, lz)] =
                        (noise * spread - (by - center)) / cfg.squash;
                }
            }
        }
        lattice
    }
}

/// Base generation populator filling the volume from the density field.
pub struct NoiseTerrainGenerator {
    density: DensityField,
}

impl NoiseTerrainGenerator {
    /// Creates the generator of a world.
    #[must_use]
    pub fn new(seed: WorldSeed, config: &TerrainConfig) -> Self {
        Self {
            density: DensityField::new(seed, config),
        }
    }

    /// The underlying density field.
    #[must_use]
    pub fn density(&self) -> &DensityField {
        &self.density
    }

    fn lattice_heights(biomes: &BiomeArea, settings: &ChunkBiomeSettings) -> LatticeHeights {
        let mut heights = [(
            BiomeGenerationSettingsBuilder::DEFAULT_MIN_HEIGHT,
            BiomeGenerationSettingsBuilder::DEFAULT_MAX_HEIGHT,
        ); LATTICE_XZ * LATTICE_XZ];
        for lx in 0..LATTICE_XZ {
            for lz in 0..LATTICE_XZ {
                let x = (lx * CELL_XZ).min(CHUNK_SIZE - 1);
                let z = (lz * CELL_XZ).min(CHUNK_SIZE - 1);
                if let Some(biome) = settings.for_column(biomes, x, z) {
                    heights[lx * LATTICE_XZ + lz] = (biome.min_height(), biome.max_height());
                }
            }
        }
        heights
    }

    /// Interpolates `lattice` into `volume`.
    fn fill(lattice: &[f64], world: &WorldConfig, volume: &mut BlockVolume) {
        let sea_level = world.sea_level;
        for cx in 0..LATTICE_XZ - 1 {
            for cz in 0..LATTICE_XZ - 1 {
                for cy in 0..LATTICE_Y - 1 {
                    let corner = |dx: usize, dy: usize, dz: usize| lattice[lattice_index(cx + dx, cy + dy, cz + dz)];
                    let (c000, c001, c010, c011) = (corner(0, 0, 0), corner(0, 0, 1), corner(0, 1, 0), corner(0, 1, 1));
                    let (c100, c101, c110, c111) = (corner(1, 0, 0), corner(1, 0, 1), corner(1, 1, 0), corner(1, 1, 1));

                    for iy in 0..CELL_Y {
                        let ty = iy as f64 / CELL_Y as f64;
                        let y = cy * CELL_Y + iy;
                        for ix in 0..CELL_XZ {
                            let tx = ix as f64 / CELL_XZ as f64;
                            for iz in 0..CELL_XZ {
                                let tz = iz as f64 / CELL_XZ as f64;
                                let density = lerp(
                                    tx,
                                    lerp(ty, lerp(tz, c000, c001), lerp(tz, c010, c011)),
                                    lerp(ty, lerp(tz, c100, c101), lerp(tz, c110, c111)),
                                );
                                let block = if density > 0.0 {
                                    Block::STONE
                                } else if (y as i32) < sea_level {
                                    world.filler_block
                                } else {
                                    Block::AIR
                                };
                                volume.set(cx * CELL_XZ + ix, y, cz * CELL_XZ + iz, block);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

impl GenerationPopulator for NoiseTerrainGenerator {
    fn kind(&self) -> GenerationPopulatorKind {
        GenerationPopulatorKind::Terrain
    }

    fn name(&self) -> &str {
        "noise_terrain"
    }

    fn populate(&self, target: &mut GenerationTarget<'_>, _rng: &mut ChunkRng) -> GenResult<()> {
        let heights = Self::lattice_heights(target.biomes, target.settings);
        let lattice = self.density.sample(target.coord, &heights);
        Self::fill(&lattice, target.world, target.volume);
        Ok(())
    }
}

/// Ground-cover replacement and bedrock band.
pub struct GroundCoverPass {
    noise: SimplexNoise,
    scale: f64,
}

impl GroundCoverPass {
    const SEED_PURPOSE: u64 = 0x5017_C0DE;

    /// Creates the pass of a world.
    #[must_use]
    pub fn new(seed: WorldSeed, config: &TerrainConfig) -> Self {
        Self {
            noise: SimplexNoise::new(seed.derive(Self::SEED_PURPOSE)),
            scale: config.cover_noise_scale,
        }
    }

    /// Secondary noise of the column at world block (`x`, `z`), roughly
    /// within [-4, 4].
    #[must_use]
    pub fn column_noise(&self, x: i32, z: i32) -> f64 {
        self.noise
            .octaved(f64::from(x) * self.scale, f64::from(z) * self.scale, 4, 0.5, 2.0)
            * 4.0
    }

    /// Covers every column of the chunk with its biome's layers.
    pub fn apply(
        &self,
        world: &WorldConfig,
        coord: ChunkCoord,
        volume: &mut BlockVolume,
        biomes: &BiomeArea,
        settings: &ChunkBiomeSettings,
        rng: &mut ChunkRng,
    ) {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                let layers = settings
                    .for_column(biomes, x, z)
                    .map_or(&[][..], |biome| biome.ground_cover_layers());
                let noise = self.column_noise(coord.world_x() + x as i32, coord.world_z() + z as i32);
                cover_column(volume, x, z, layers, noise, world, rng);
            }
        }
    }
}

/// First layer at or after `from` whose drawn depth is positive.
fn next_layer(
    layers: &[GroundCoverLayer],
    from: usize,
    rng: &mut ChunkRng,
    noise: f64,
) -> Option<(usize, i32)> {
    (from..layers.len()).find_map(|i| {
        let depth = layers[i].depth.floored_amount(rng, noise);
        (depth > 0).then_some((i, depth))
    })
}

/// Runs the layering state machine over one column.
///
/// `remaining` is -1 outside a solid span, the rows left in the current layer
/// inside one, and 0 once the layers of the span are used up.
pub(crate) fn cover_column(
    volume: &mut BlockVolume,
    x: usize,
    z: usize,
    layers: &[GroundCoverLayer],
    noise: f64,
    world: &WorldConfig,
    rng: &mut ChunkRng,
) {
    let sea_level = world.sea_level;
    let mut remaining: i32 = -1;
    let mut layer = 0usize;

    for y in (0..CHUNK_HEIGHT).rev() {
        if y < FLOOR_BAND && y as i32 <= rng.gen_range(0..FLOOR_BAND as i32) {
            volume.set(x, y, z, world.floor_block);
            continue;
        }

        let current = volume.get(x, y, z);
        if !current.is_solid() {
            remaining = -1;
            continue;
        }
        if !current.same_type(Block::STONE) {
            continue;
        }

        if remaining > 0 {
            volume.set(x, y, z, layers[layer].selector.select(noise));
            remaining -= 1;
        } else if remaining == -1 {
            let Some((first, depth)) = next_layer(layers, 0, rng, noise) else {
                remaining = 0;
                continue;
            };
            let yi = y as i32;
            let start = if yi >= sea_level - 1 {
                Some((first, depth))
            } else if yi < sea_level - 7 - depth {
                volume.set(x, y, z, Block::GRAVEL);
                remaining = 0;
                continue;
            } else {
                next_layer(layers, first + 1, rng, noise)
            };
            let Some((index, depth)) = start else {
                remaining = 0;
                continue;
            };
            layer = index;
            volume.set(x, y, z, layers[layer].selector.select(noise));
            remaining = depth - 1;
        } else {
            continue;
        }

        if remaining == 0 {
            if let Some((index, depth)) = next_layer(layers, layer + 1, rng, noise) {
                layer = index;
                remaining = depth;
            }
        }
    }
}
