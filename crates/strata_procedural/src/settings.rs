//! # Biome Generation Settings
//!
//! Per-biome record of height bounds, ground-cover layers and populator
//! lists, assembled through [`BiomeGenerationSettingsBuilder`].
//!
//! ## Validation
//!
//! The builder distinguishes "intentionally empty" from "never set": every
//! list must be assigned (possibly to an empty list) before
//! [`build`](BiomeGenerationSettingsBuilder::build) succeeds.

use std::fmt;
use std::sync::Arc;

use crate::amount::SeededAmount;
use crate::biome::BiomeType;
use crate::chunk::{BiomeArea, Block};
use crate::error::{GenResult, GenerationError};
use crate::populator::{GenerationPopulator, Populator};

/// Picks a block state from a column's ground-cover noise value.
#[derive(Clone)]
pub enum BlockSelector {
    /// Always the same block.
    Fixed(Block),
    /// `above` when the noise exceeds `threshold`, otherwise `below`.
    NoiseThreshold {
        /// Noise cutoff.
        threshold: f64,
        /// Block for noise above the cutoff.
        above: Block,
        /// Block for noise at or below the cutoff.
        below: Block,
    },
    /// Arbitrary function of the noise value.
    Custom(Arc<dyn Fn(f64) -> Block + Send + Sync>),
}

impl BlockSelector {
    /// Evaluates the selector.
    #[inline]
    #[must_use]
    pub fn select(&self, noise: f64) -> Block {
        match self {
            Self::Fixed(block) => *block,
            Self::NoiseThreshold {
                threshold,
                above,
                below,
            } => {
                if noise > *threshold {
                    *above
                } else {
                    *below
                }
            }
            Self::Custom(select) => select(noise),
        }
    }
}

impl From<Block> for BlockSelector {
    fn from(block: Block) -> Self {
        Self::Fixed(block)
    }
}

impl fmt::Debug for BlockSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(block) => f.debug_tuple("Fixed").field(block).finish(),
            Self::NoiseThreshold {
                threshold,
                above,
                below,
            } => f
                .debug_struct("NoiseThreshold")
                .field("threshold", threshold)
                .field("above", above)
                .field("below", below)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One band of the surface material stack.
#[derive(Clone, Debug)]
pub struct GroundCoverLayer {
    /// Block placed in this band.
    pub selector: BlockSelector,
    /// Rows in this band.
    pub depth: SeededAmount,
}

impl GroundCoverLayer {
    /// Creates a layer.
    #[must_use]
    pub fn new(selector: impl Into<BlockSelector>, depth: SeededAmount) -> Self {
        Self {
            selector: selector.into(),
            depth,
        }
    }

    /// A single-row layer of a fixed block, e.g. grass.
    #[must_use]
    pub fn top(block: Block) -> Self {
        Self::new(block, SeededAmount::fixed(1.0))
    }
}

/// Shared handle to a generation populator.
pub type SharedGenerationPopulator = Arc<dyn GenerationPopulator>;

/// Shared handle to a decoration populator.
pub type SharedPopulator = Arc<dyn Populator>;

/// Validated per-biome configuration.
#[derive(Clone)]
pub struct BiomeGenerationSettings {
    min_height: f32,
    max_height: f32,
    ground_cover: Vec<GroundCoverLayer>,
    generation_populators: Vec<SharedGenerationPopulator>,
    populators: Vec<SharedPopulator>,
}

impl BiomeGenerationSettings {
    /// Starts a builder with default heights and no lists set.
    #[must_use]
    pub fn builder() -> BiomeGenerationSettingsBuilder {
        BiomeGenerationSettingsBuilder::new()
    }

    /// Lower terrain height bound.
    #[inline]
    #[must_use]
    pub const fn min_height(&self) -> f32 {
        self.min_height
    }

    /// Upper terrain height bound; never below [`min_height`](Self::min_height).
    #[inline]
    #[must_use]
    pub const fn max_height(&self) -> f32 {
        self.max_height
    }

    /// Ground-cover layers, top-down.
    #[must_use]
    pub fn ground_cover_layers(&self) -> &[GroundCoverLayer] {
        &self.ground_cover
    }

    /// Generation populators run once per chunk containing this biome.
    #[must_use]
    pub fn generation_populators(&self) -> &[SharedGenerationPopulator] {
        &self.generation_populators
    }

    /// Decoration populators run for chunks whose primary biome is this one.
    #[must_use]
    pub fn populators(&self) -> &[SharedPopulator] {
        &self.populators
    }
}

impl fmt::Debug for BiomeGenerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiomeGenerationSettings")
            .field("min_height", &self.min_height)
            .field("max_height", &self.max_height)
            .field("ground_cover", &self.ground_cover)
            .field(
                "generation_populators",
                &self
                    .generation_populators
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "populators",
                &self.populators.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Settings of the biomes present in one chunk, in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct ChunkBiomeSettings {
    entries: Vec<(BiomeType, Arc<BiomeGenerationSettings>)>,
}

impl ChunkBiomeSettings {
    /// An empty view.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds settings for a biome not yet present.
    pub fn insert(&mut self, biome: BiomeType, settings: Arc<BiomeGenerationSettings>) {
        if self.get(biome).is_none() {
            self.entries.push((biome, settings));
        }
    }

    /// Settings for `biome`, if it is present in the chunk.
    #[must_use]
    pub fn get(&self, biome: BiomeType) -> Option<&BiomeGenerationSettings> {
        self.entries
            .iter()
            .find(|(b, _)| *b == biome)
            .map(|(_, settings)| settings.as_ref())
    }

    /// Settings for the biome of a local column.
    #[must_use]
    pub fn for_column(
        &self,
        biomes: &BiomeArea,
        x: usize,
        z: usize,
    ) -> Option<&BiomeGenerationSettings> {
        self.get(biomes.get(x, z))
    }

    /// Iterates biomes and their settings in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeType, &BiomeGenerationSettings)> {
        self.entries.iter().map(|(b, s)| (*b, s.as_ref()))
    }
}

/// Builder for [`BiomeGenerationSettings`].
#[derive(Clone)]
pub struct BiomeGenerationSettingsBuilder {
    min_height: f32,
    max_height: f32,
    ground_cover: Option<Vec<GroundCoverLayer>>,
    generation_populators: Option<Vec<SharedGenerationPopulator>>,
    populators: Option<Vec<SharedPopulator>>,
}

impl BiomeGenerationSettingsBuilder {
    /// Default lower height bound after [`reset`](Self::reset).
    pub const DEFAULT_MIN_HEIGHT: f32 = 0.1;
    /// Default upper height bound after [`reset`](Self::reset).
    pub const DEFAULT_MAX_HEIGHT: f32 = 0.2;

    /// Creates a builder in the reset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_height: Self::DEFAULT_MIN_HEIGHT,
            max_height: Self::DEFAULT_MAX_HEIGHT,
            ground_cover: None,
            generation_populators: None,
            populators: None,
        }
    }

    /// Sets the lower height bound.
    pub fn min_height(&mut self, height: f32) -> &mut Self {
        self.min_height = height;
        self
    }

    /// Sets the upper height bound.
    pub fn max_height(&mut self, height: f32) -> &mut Self {
        self.max_height = height;
        self
    }

    /// Replaces the ground-cover layers with a copy of `layers`.
    pub fn ground_cover_layers(&mut self, layers: &[GroundCoverLayer]) -> &mut Self {
        self.ground_cover = Some(layers.to_vec());
        self
    }

    /// Replaces the generation populators with a copy of `populators`.
    pub fn generation_populators(
        &mut self,
        populators: &[SharedGenerationPopulator],
    ) -> &mut Self {
        self.generation_populators = Some(populators.to_vec());
        self
    }

    /// Replaces the decoration populators with a copy of `populators`.
    pub fn populators(&mut self, populators: &[SharedPopulator]) -> &mut Self {
        self.populators = Some(populators.to_vec());
        self
    }

    /// Restores default heights and unsets every list.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    /// Copies every field from existing settings.
    pub fn reset_from(&mut self, settings: &BiomeGenerationSettings) -> &mut Self {
        self.min_height = settings.min_height;
        self.max_height = settings.max_height;
        self.ground_cover = Some(settings.ground_cover.clone());
        self.generation_populators = Some(settings.generation_populators.clone());
        self.populators = Some(settings.populators.clone());
        self
    }

    /// Validates and builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidSettings`] when a height is not
    /// finite, when `max < min` or when any list was never assigned.
    pub fn build(&self) -> GenResult<BiomeGenerationSettings> {
        if !self.min_height.is_finite() || !self.max_height.is_finite() {
            return Err(GenerationError::invalid_settings(format!(
                "heights must be finite (min {}, max {})",
                self.min_height, self.max_height
            )));
        }
        if self.max_height < self.min_height {
            return Err(GenerationError::invalid_settings(format!(
                "max height cannot be less than min height ({} < {})",
                self.max_height, self.min_height
            )));
        }
        let ground_cover = self
            .ground_cover
            .clone()
            .ok_or_else(|| GenerationError::invalid_settings("ground cover layers were not set"))?;
        let generation_populators = self.generation_populators.clone().ok_or_else(|| {
            GenerationError::invalid_settings("generation populators were not set")
        })?;
        let populators = self
            .populators
            .clone()
            .ok_or_else(|| GenerationError::invalid_settings("populators were not set"))?;

        Ok(BiomeGenerationSettings {
            min_height: self.min_height,
            max_height: self.max_height,
            ground_cover,
            generation_populators,
            populators,
        })
    }
}

impl Default for BiomeGenerationSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
