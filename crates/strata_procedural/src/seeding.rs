//! Per-chunk random streams.
//!
//! Each phase of each chunk gets its own RNG, derived only from the world
//! seed and the chunk coordinate. Nothing here depends on which chunks were
//! generated before, so any generation order yields the same world.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::chunk::ChunkCoord;
use crate::noise::WorldSeed;

/// The random stream consumed by one phase of one chunk.
pub type ChunkRng = ChaCha8Rng;

/// X multiplier for the generate-phase seed.
const GENERATE_X: i64 = 341_873_128_712;
/// Z multiplier for the generate-phase seed.
const GENERATE_Z: i64 = 132_897_987_541;

/// Mixed into every generate-phase seed.
const GENERATE_SALT: u64 = 0x9E37_79B9_7F4A_7C15;
/// Mixed into every populate-phase seed.
const DECORATE_SALT: u64 = 0xC2B2_AE3D_27D4_EB4F;

/// ChaCha stream of the generate phase.
const GENERATE_STREAM: u64 = 0;
/// ChaCha stream of the populate phase.
const DECORATE_STREAM: u64 = 1;

/// Seed for the generate phase of `coord`.
#[must_use]
pub fn generation_seed(world: WorldSeed, coord: ChunkCoord) -> u64 {
    let mixed = i64::from(coord.x)
        .wrapping_mul(GENERATE_X)
        .wrapping_add(i64::from(coord.z).wrapping_mul(GENERATE_Z));
    (mixed ^ world.as_i64()) as u64 ^ GENERATE_SALT
}

/// Seed for the populate phase of `coord`.
///
/// Two odd multipliers are drawn from a stream seeded by the world seed. The
/// phase salts keep this apart from [`generation_seed`] even where both
/// coordinate mixes are zero.
#[must_use]
pub fn decoration_seed(world: WorldSeed, coord: ChunkCoord) -> u64 {
    let mut rng = ChaCha8Rng::seed_from_u64(world.value());
    let a = (rng.next_u64() as i64) / 2 * 2 + 1;
    let b = (rng.next_u64() as i64) / 2 * 2 + 1;
    let mixed = i64::from(coord.x)
        .wrapping_mul(a)
        .wrapping_add(i64::from(coord.z).wrapping_mul(b));
    (mixed ^ world.as_i64()) as u64 ^ DECORATE_SALT
}

/// Fresh RNG for the generate phase.
#[must_use]
pub fn generation_rng(world: WorldSeed, coord: ChunkCoord) -> ChunkRng {
    let mut rng = ChaCha8Rng::seed_from_u64(generation_seed(world, coord));
    rng.set_stream(GENERATE_STREAM);
    rng
}

/// Fresh RNG for the populate phase.
///
/// Reads a different ChaCha stream than [`generation_rng`], so the phases
/// never share draws even if their seeds collide.
#[must_use]
pub fn decoration_rng(world: WorldSeed, coord: ChunkCoord) -> ChunkRng {
    let mut rng = ChaCha8Rng::seed_from_u64(decoration_seed(world, coord));
    rng.set_stream(DECORATE_STREAM);
    rng
}

/// Independent sub-stream for a single feature (e.g. a cave carver) that
/// must not perturb the phase stream.
#[must_use]
pub fn feature_rng(world: WorldSeed, coord: ChunkCoord, feature: u64) -> ChunkRng {
    ChaCha8Rng::seed_from_u64(generation_seed(world.derive(feature), coord))
}
