//! # Noise Implementation
//!
//! Deterministic noise for terrain generation.
//!
//! - `SimplexNoise` (2D): ground-cover depth variation and biome climate.
//! - `PerlinNoise` / `OctavePerlin` (3D): the terrain density lattice.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, every sampler here produces **exactly** the
//! same values on any platform, any time. No sampler reads global state.

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Creates a world seed from a signed value (as typed in configs).
    #[inline]
    #[must_use]
    pub const fn from_i64(seed: i64) -> Self {
        Self(seed as u64)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the seed reinterpreted as a signed value.
    #[inline]
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }

    /// Derives a sub-seed for a specific purpose (e.g., biome generation).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a hash mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// 12 gradient vectors for 2D simplex.
    const GRAD2: [[i8; 2]; 12] = [
        [1, 0], [1, 1], [0, 1], [-1, 1],
        [-1, 0], [-1, -1], [0, -1], [1, -1],
        [1, 0], [0, 1], [-1, 0], [0, -1],
    ];

    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle; xorshift64 stalls on zero, so remix it first
        let mut rng_state = seed.value() | 1;
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state as usize) % (i + 1);
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    /// Gets a 2D gradient for a given hash.
    #[inline]
    fn gradient2(hash: u8) -> [i8; 2] {
        Self::GRAD2[(hash % 12) as usize]
    }
}

/// 2D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
pub struct SimplexNoise {
    /// The permutation table.
    perm_table: PermutationTable,
}

impl SimplexNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
        }
    }

    /// Samples 2D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        // Unskew to get first corner in simplex
        let unskew = f64::from(i + j) * Self::G2;
        let x0 = x - (f64::from(i) - unskew);
        let y0 = y - (f64::from(j) - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1 as u8) + Self::G2;
        let y1 = y0 - f64::from(j1 as u8) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let gi0 = self.perm_table.get(ii + self.perm_table.get(jj) as usize);
        let gi1 = self.perm_table.get(ii + i1 + self.perm_table.get(jj + j1) as usize);
        let gi2 = self.perm_table.get(ii + 1 + self.perm_table.get(jj + 1) as usize);

        let n0 = Self::contribution(x0, y0, gi0);
        let n1 = Self::contribution(x1, y1, gi1);
        let n2 = Self::contribution(x2, y2, gi2);

        // 70.0 normalizes the output to [-1, 1]
        70.0 * (n0 + n1 + n2)
    }

    /// Calculates the contribution from one corner of the simplex.
    #[inline]
    fn contribution(x: f64, y: f64, gradient_index: u8) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let grad = PermutationTable::gradient2(gradient_index);
            let t2 = t * t;
            t2 * t2 * (x * f64::from(grad[0]) + y * f64::from(grad[1]))
        }
    }

    /// Generates octaved (fractal) noise.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Coordinates
    /// * `octaves` - Number of noise layers (typically 4-8)
    /// * `persistence` - Amplitude decay per octave (typically 0.5)
    /// * `lacunarity` - Frequency increase per octave (typically 2.0)
    ///
    /// # Returns
    ///
    /// A value roughly in the range [-1, 1].
    #[must_use]
    pub fn octaved(
        &self,
        x: f64,
        y: f64,
        octaves: u32,
        persistence: f64,
        lacunarity: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        total / max_amplitude
    }

    /// Generates ridged noise (good for mountains).
    #[must_use]
    pub fn ridged(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            let noise = self.sample(x * frequency, y * frequency);
            let ridge = 1.0 - noise.abs();
            total += ridge * ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        total / max_amplitude
    }
}

/// 3D improved Perlin noise.
///
/// Output is roughly in [-1, 1]; zero at every integer lattice point.
pub struct PerlinNoise {
    perm_table: PermutationTable,
    /// Per-instance offset so integer inputs do not all land on zeros.
    offset: [f64; 3],
}

impl PerlinNoise {
    /// Creates a new perlin noise generator from a seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        let bits = seed.derive(0x0FF5E7).value();
        let unit = |shift: u32| f64::from(((bits >> shift) & 0xFFFF) as u16) / 65536.0 * 256.0;
        Self {
            perm_table: PermutationTable::new(seed),
            offset: [unit(0), unit(16), unit(32)],
        }
    }

    /// Samples 3D noise.
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let x = x + self.offset[0];
        let y = y + self.offset[1];
        let z = z + self.offset[2];

        let xi = fast_floor(x);
        let yi = fast_floor(y);
        let zi = fast_floor(z);

        let xf = x - f64::from(xi);
        let yf = y - f64::from(yi);
        let zf = z - f64::from(zi);

        let u = fade(xf);
        let v = fade(yf);
        let w = fade(zf);

        let p = |i: usize| self.perm_table.get(i) as usize;
        let xi = (xi & 255) as usize;
        let yi = (yi & 255) as usize;
        let zi = (zi & 255) as usize;

        let a = p(xi) + yi;
        let aa = p(a) + zi;
        let ab = p(a + 1) + zi;
        let b = p(xi + 1) + yi;
        let ba = p(b) + zi;
        let bb = p(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad3(p(aa), xf, yf, zf), grad3(p(ba), xf - 1.0, yf, zf)),
                lerp(u, grad3(p(ab), xf, yf - 1.0, zf), grad3(p(bb), xf - 1.0, yf - 1.0, zf)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad3(p(aa + 1), xf, yf, zf - 1.0),
                    grad3(p(ba + 1), xf - 1.0, yf, zf - 1.0),
                ),
                lerp(
                    u,
                    grad3(p(ab + 1), xf, yf - 1.0, zf - 1.0),
                    grad3(p(bb + 1), xf - 1.0, yf - 1.0, zf - 1.0),
                ),
            ),
        )
    }
}

/// Several perlin octaves summed with halving amplitude.
///
/// Octave `n` runs at frequency `2^-n` relative to the first and carries
/// amplitude `2^n`, so low frequencies dominate.
pub struct OctavePerlin {
    octaves: Vec<PerlinNoise>,
}

impl OctavePerlin {
    /// Creates `count` independent octaves derived from `seed`.
    #[must_use]
    pub fn new(seed: WorldSeed, count: u32) -> Self {
        Self {
            octaves: (0..count)
                .map(|i| PerlinNoise::new(seed.derive(0x0C7A_0000 + u64::from(i))))
                .collect(),
        }
    }

    /// Number of octaves.
    #[must_use]
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }

    /// Samples the octave sum, normalized to roughly [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        let mut max_amplitude = 0.0;

        for octave in &self.octaves {
            total += octave.sample(x * frequency, y * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            frequency *= 0.5;
            amplitude *= 2.0;
        }

        if max_amplitude == 0.0 {
            0.0
        } else {
            total / max_amplitude
        }
    }
}

/// Fast floor function.
#[inline]
fn fast_floor(x: f64) -> i32 {
    let xi = x as i32;
    if x < f64::from(xi) { xi - 1 } else { xi }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
fn grad3(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}
