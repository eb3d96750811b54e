//! # Biome Classification
//!
//! Biome types and the strategies that paint them onto a chunk footprint.
//!
//! The default [`ClimateBiomeGenerator`] uses a climate model based on:
//! - Temperature (from latitude and elevation)
//! - Humidity (from a separate noise channel)
//! - Elevation (from a low-frequency continent noise)

use std::fmt;

use crate::chunk::{BiomeArea, CHUNK_SIZE};
use crate::noise::{SimplexNoise, WorldSeed};

/// Biome types in the world.
///
/// Discriminants are stable ids; they are what chunks store and export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BiomeType {
    /// Open ocean.
    Ocean = 0,
    /// Grassland.
    Plains = 1,
    /// Arid desert.
    Desert = 2,
    /// High, rugged hills.
    ExtremeHills = 3,
    /// Oak and birch forest.
    Forest = 4,
    /// Spruce forest.
    Taiga = 5,
    /// Wetland.
    Swampland = 6,
    /// River channel.
    River = 7,
    /// Ocean with an iced-over surface.
    FrozenOcean = 10,
    /// Snowy plains.
    IcePlains = 12,
    /// Sandy shore.
    Beach = 16,
    /// Dunes at the edge of a desert.
    DesertHills = 17,
    /// Dense jungle.
    Jungle = 21,
    /// Deep ocean.
    DeepOcean = 24,
    /// Birch forest.
    BirchForest = 27,
    /// Snowy spruce forest.
    ColdTaiga = 30,
    /// Savanna grassland.
    Savanna = 35,
    /// Clay badlands.
    Mesa = 37,
}

/// A creature species the fauna populator can record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    /// Pig.
    Pig,
    /// Cow.
    Cow,
    /// Sheep.
    Sheep,
    /// Chicken.
    Chicken,
    /// Wolf.
    Wolf,
    /// Rabbit.
    Rabbit,
    /// Horse.
    Horse,
    /// Ocelot.
    Ocelot,
}

impl BiomeType {
    /// Every registered biome type, in id order.
    pub const ALL: [Self; 18] = [
        Self::Ocean,
        Self::Plains,
        Self::Desert,
        Self::ExtremeHills,
        Self::Forest,
        Self::Taiga,
        Self::Swampland,
        Self::River,
        Self::FrozenOcean,
        Self::IcePlains,
        Self::Beach,
        Self::DesertHills,
        Self::Jungle,
        Self::DeepOcean,
        Self::BirchForest,
        Self::ColdTaiga,
        Self::Savanna,
        Self::Mesa,
    ];

    /// Stable numeric id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks up a biome by id.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|biome| biome.id() == id)
    }

    /// Lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ocean => "ocean",
            Self::Plains => "plains",
            Self::Desert => "desert",
            Self::ExtremeHills => "extreme_hills",
            Self::Forest => "forest",
            Self::Taiga => "taiga",
            Self::Swampland => "swampland",
            Self::River => "river",
            Self::FrozenOcean => "frozen_ocean",
            Self::IcePlains => "ice_plains",
            Self::Beach => "beach",
            Self::DesertHills => "desert_hills",
            Self::Jungle => "jungle",
            Self::DeepOcean => "deep_ocean",
            Self::BirchForest => "birch_forest",
            Self::ColdTaiga => "cold_taiga",
            Self::Savanna => "savanna",
            Self::Mesa => "mesa",
        }
    }

    /// Desert and desert hills; water lakes skip these.
    #[inline]
    #[must_use]
    pub const fn is_desert_family(self) -> bool {
        matches!(self, Self::Desert | Self::DesertHills)
    }

    /// Biomes where snow settles and still water freezes.
    #[inline]
    #[must_use]
    pub const fn is_frozen(self) -> bool {
        matches!(self, Self::FrozenOcean | Self::IcePlains | Self::ColdTaiga)
    }

    /// Water-covered biomes.
    #[inline]
    #[must_use]
    pub const fn is_ocean(self) -> bool {
        matches!(
            self,
            Self::Ocean | Self::DeepOcean | Self::FrozenOcean | Self::River
        )
    }

    /// Creatures that spawn with the chunk.
    #[must_use]
    pub const fn species(self) -> &'static [Species] {
        match self {
            Self::Plains => &[Species::Sheep, Species::Pig, Species::Cow, Species::Horse],
            Self::Savanna => &[Species::Horse, Species::Cow, Species::Sheep],
            Self::Forest | Self::BirchForest | Self::Swampland | Self::ExtremeHills => {
                &[Species::Sheep, Species::Pig, Species::Chicken, Species::Cow]
            }
            Self::Taiga | Self::ColdTaiga => &[Species::Wolf, Species::Rabbit, Species::Sheep],
            Self::IcePlains => &[Species::Rabbit],
            Self::Jungle => &[Species::Ocelot, Species::Chicken, Species::Pig],
            Self::Desert | Self::DesertHills => &[Species::Rabbit],
            Self::Ocean
            | Self::DeepOcean
            | Self::FrozenOcean
            | Self::River
            | Self::Beach
            | Self::Mesa => &[],
        }
    }
}

impl fmt::Display for BiomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy that fills a chunk's [`BiomeArea`].
///
/// Implementations must be pure in the world seed and the area's chunk
/// coordinate; they may be called for any chunk in any order.
pub trait BiomeGenerator: Send + Sync {
    /// Fills every column of `area`.
    fn generate_biomes(&self, area: &mut BiomeArea);

    /// Name used in logs and override conflicts.
    fn name(&self) -> &str;
}

/// A biome generator that paints every column with one biome.
#[derive(Clone, Copy, Debug)]
pub struct SingleBiomeGenerator {
    biome: BiomeType,
}

impl SingleBiomeGenerator {
    /// Creates a generator for `biome`.
    #[must_use]
    pub const fn new(biome: BiomeType) -> Self {
        Self { biome }
    }
}

impl BiomeGenerator for SingleBiomeGenerator {
    fn generate_biomes(&self, area: &mut BiomeArea) {
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                area.set(x, z, self.biome);
            }
        }
    }

    fn name(&self) -> &str {
        "single_biome"
    }
}

/// Biome generator that determines the biome from climate noise.
pub struct ClimateBiomeGenerator {
    /// Temperature noise
    temperature_noise: SimplexNoise,
    /// Humidity noise
    humidity_noise: SimplexNoise,
    /// Continent noise
    elevation_noise: SimplexNoise,
    /// River channel noise
    river_noise: SimplexNoise,
}

impl ClimateBiomeGenerator {
    /// Scale for temperature noise (larger = more gradual changes).
    const TEMPERATURE_SCALE: f64 = 0.002;
    /// Scale for humidity noise.
    const HUMIDITY_SCALE: f64 = 0.003;
    /// Scale for continent noise.
    const ELEVATION_SCALE: f64 = 0.0025;
    /// Scale for river noise.
    const RIVER_SCALE: f64 = 0.004;
    /// Half-width of river channels in noise units.
    const RIVER_WIDTH: f64 = 0.02;

    /// Creates a new biome generator from a world seed.
    #[must_use]
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            temperature_noise: SimplexNoise::new(seed.derive(1)),
            humidity_noise: SimplexNoise::new(seed.derive(2)),
            elevation_noise: SimplexNoise::new(seed.derive(3)),
            river_noise: SimplexNoise::new(seed.derive(4)),
        }
    }

    /// Classifies the biome at world block coordinates.
    #[must_use]
    pub fn classify(&self, x: f64, z: f64) -> BiomeType {
        let elevation = self.elevation(x, z);
        let temperature = self.temperature(x, z, elevation);
        let humidity = self.humidity(x, z);

        if elevation > -0.1 && elevation < 0.6 {
            let river = self
                .river_noise
                .sample(x * Self::RIVER_SCALE, z * Self::RIVER_SCALE);
            if river.abs() < Self::RIVER_WIDTH {
                return BiomeType::River;
            }
        }

        Self::classify_from_climate(elevation, temperature, humidity)
    }

    /// Continent elevation in roughly [-1, 1].
    ///
    /// - < -0.5: Deep ocean
    /// - < -0.2: Ocean
    /// - < -0.1: Beach
    /// - > 0.6: Hills
    #[must_use]
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let base = self.elevation_noise.octaved(
            x * Self::ELEVATION_SCALE,
            z * Self::ELEVATION_SCALE,
            4,
            0.5,
            2.0,
        );
        let ridged = self.elevation_noise.ridged(
            x * Self::ELEVATION_SCALE * 1.5,
            z * Self::ELEVATION_SCALE * 1.5,
            3,
            0.5,
            2.0,
        );
        base * 0.8 + ridged * 0.2
    }

    /// Temperature in [-1, 1]; colder away from `z = 0` and at altitude.
    #[must_use]
    pub fn temperature(&self, x: f64, z: f64, elevation: f64) -> f64 {
        let base = self
            .temperature_noise
            .sample(x * Self::TEMPERATURE_SCALE, z * Self::TEMPERATURE_SCALE);
        let latitude_factor = (z.abs() * 0.0001).min(1.0);
        let elevation_factor = elevation.max(0.0) * 0.5;

        (base - latitude_factor * 0.5 - elevation_factor).clamp(-1.0, 1.0)
    }

    /// Humidity in [-1, 1].
    #[must_use]
    pub fn humidity(&self, x: f64, z: f64) -> f64 {
        self.humidity_noise.octaved(
            x * Self::HUMIDITY_SCALE,
            z * Self::HUMIDITY_SCALE,
            4,
            0.5,
            2.0,
        )
    }

    fn classify_from_climate(elevation: f64, temperature: f64, humidity: f64) -> BiomeType {
        // Water biomes
        if elevation < -0.5 {
            return BiomeType::DeepOcean;
        }
        if elevation < -0.2 {
            if temperature < -0.5 {
                return BiomeType::FrozenOcean;
            }
            return BiomeType::Ocean;
        }
        if elevation < -0.1 {
            return BiomeType::Beach;
        }

        if elevation > 0.6 {
            return BiomeType::ExtremeHills;
        }

        match (temperature, humidity) {
            // Cold biomes
            (t, _) if t < -0.5 => BiomeType::IcePlains,
            (t, h) if t < -0.35 && h > 0.0 => BiomeType::ColdTaiga,
            (t, _) if t < -0.2 => BiomeType::Taiga,

            // Hot biomes
            (t, h) if t > 0.5 && h < -0.3 => {
                if elevation > 0.3 {
                    BiomeType::DesertHills
                } else {
                    BiomeType::Desert
                }
            }
            (t, h) if t > 0.5 && h > 0.5 => BiomeType::Jungle,
            (t, h) if t > 0.3 && h < 0.0 => BiomeType::Savanna,
            (t, _) if t > 0.6 => BiomeType::Mesa,

            // Temperate biomes
            (_, h) if h > 0.5 && elevation < 0.1 => BiomeType::Swampland,
            (_, h) if h > 0.35 => BiomeType::BirchForest,
            (_, h) if h > 0.2 => BiomeType::Forest,

            _ => BiomeType::Plains,
        }
    }
}

impl BiomeGenerator for ClimateBiomeGenerator {
    fn generate_biomes(&self, area: &mut BiomeArea) {
        let coord = area.coord();
        for z in 0..CHUNK_SIZE {
            for x in 0..CHUNK_SIZE {
                let world_x = f64::from(coord.world_x() + x as i32);
                let world_z = f64::from(coord.world_z() + z as i32);
                area.set(x, z, self.classify(world_x, world_z));
            }
        }
    }

    fn name(&self) -> &str {
        "climate"
    }
}
