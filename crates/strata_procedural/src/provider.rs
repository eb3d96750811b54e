//! # Chunk Provider
//!
//! Drives the two phases of every chunk.
//!
//! ## Generate
//!
//! 1. Seed the generation stream from the world seed and chunk coordinate
//! 2. Fill the [`BiomeArea`] with the biome generator
//! 3. Resolve settings of every biome present, in first-seen order
//! 4. Run the base generator over a fresh [`BlockVolume`]
//! 5. Ground-cover pass
//! 6. Global generation populators, in list order
//! 7. Each present biome's own generation populators, once per biome
//! 8. Assemble the [`Chunk`] and compute its light and height data
//!
//! ## Populate
//!
//! Reseeds from a different mix of the same inputs, so the stream depends on
//! the chunk alone and never on what was generated before. The primary
//! biome's populators run first, then the global ones, all sharing one
//! [`DecorationContext`]. Gravity updates are suppressed for the duration of
//! the phase and restored on every exit path, including errors.
//!
//! The provider takes `&self` for both phases, so several chunks can be
//! worked on concurrently as long as each chunk has a single owner.

use crate::biome::BiomeType;
use crate::chunk::{BiomeArea, BlockVolume, Chunk, ChunkCoord, CHUNK_SIZE};
use crate::error::GenResult;
use crate::events::{EventSender, GenerationEvent};
use crate::physics::GravitySuppression;
use crate::populator::{DecorationContext, GenerationTarget};
use crate::seeding::{decoration_rng, generation_rng};
use crate::settings::{ChunkBiomeSettings, SharedPopulator};
use crate::terrain::GroundCoverPass;
use crate::world_generator::WorldGenerator;

/// What a populate phase did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecorationReport {
    /// Names of the populators that ran, in order.
    pub populators: Vec<String>,
    /// Flags set during the phase, in order.
    pub flags: Vec<String>,
}

/// Runs the generate and populate phases for a world.
pub struct ChunkProvider {
    generator: WorldGenerator,
    ground_cover: GroundCoverPass,
    events: Option<EventSender>,
}

impl ChunkProvider {
    /// Creates a provider over a fully configured world generator.
    #[must_use]
    pub fn new(generator: WorldGenerator) -> Self {
        let config = generator.config();
        let ground_cover = GroundCoverPass::new(config.world_seed(), &config.terrain);
        Self {
            generator,
            ground_cover,
            events: None,
        }
    }

    /// Announces phases on `events`.
    #[must_use]
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// The world generator.
    #[must_use]
    pub fn generator(&self) -> &WorldGenerator {
        &self.generator
    }

    /// Mutable world generator, for setup before generation starts.
    pub fn generator_mut(&mut self) -> &mut WorldGenerator {
        &mut self.generator
    }

    fn emit(&self, event: GenerationEvent) {
        if let Some(events) = &self.events {
            events.send(event);
        }
    }

    /// Generates the base terrain of a chunk.
    ///
    /// # Errors
    ///
    /// Returns the first error of a biome settings lookup or a generation
    /// populator; no chunk is produced then.
    pub fn provide_chunk(&self, coord: ChunkCoord) -> GenResult<Chunk> {
        let world = self.generator.config();
        let mut rng = generation_rng(world.world_seed(), coord);

        let mut biomes = BiomeArea::new(coord, BiomeType::Ocean);
        self.generator.biome_generator().generate_biomes(&mut biomes);

        let present = biomes.unique();
        let mut settings = ChunkBiomeSettings::new();
        for &biome in &present {
            settings.insert(biome, self.generator.biome_settings(biome)?);
        }

        let mut volume = BlockVolume::new();
        {
            let mut target = GenerationTarget {
                world,
                coord,
                volume: &mut volume,
                biomes: &biomes,
                settings: &settings,
            };
            let base = self.generator.base_generation_populator();
            tracing::trace!(%coord, populator = base.name(), "base generation");
            base.populate(&mut target, &mut rng)?;
        }

        self.ground_cover
            .apply(world, coord, &mut volume, &biomes, &settings, &mut rng);

        let mut target = GenerationTarget {
            world,
            coord,
            volume: &mut volume,
            biomes: &biomes,
            settings: &settings,
        };
        for populator in self.generator.generation_populators() {
            tracing::trace!(%coord, populator = populator.name(), "generation populator");
            populator.populate(&mut target, &mut rng)?;
        }
        for (biome, biome_settings) in settings.iter() {
            for populator in biome_settings.generation_populators() {
                tracing::trace!(%coord, %biome, populator = populator.name(), "biome generation populator");
                populator.populate(&mut target, &mut rng)?;
            }
        }

        let mut chunk = Chunk::from_parts(coord, volume, &biomes);
        chunk.generate_skylight_map();
        tracing::debug!(%coord, biomes = present.len(), "chunk generated");
        self.emit(GenerationEvent::ChunkGenerated { coord });
        Ok(chunk)
    }

    /// Populators that decorate `chunk`: its primary biome's, then the
    /// global ones.
    ///
    /// # Errors
    ///
    /// Propagates a biome settings lookup failure.
    pub fn resolve_populators(&self, chunk: &Chunk) -> GenResult<Vec<SharedPopulator>> {
        let primary = chunk.biome(CHUNK_SIZE / 2, CHUNK_SIZE / 2);
        let settings = self.generator.biome_settings(primary)?;
        let mut populators = settings.populators().to_vec();
        populators.extend(self.generator.populators().iter().cloned());
        Ok(populators)
    }

    /// Decorates a generated chunk.
    ///
    /// A chunk that is already populated is left untouched and an empty
    /// report is returned.
    ///
    /// # Errors
    ///
    /// The first populator error aborts the remaining populators and is
    /// returned; the chunk keeps whatever was placed before it and stays
    /// unpopulated.
    pub fn populate(&self, chunk: &mut Chunk) -> GenResult<DecorationReport> {
        let coord = chunk.coord;
        if chunk.populated {
            tracing::debug!(%coord, "chunk already populated");
            return Ok(DecorationReport::default());
        }

        let _gravity = GravitySuppression::new();
        let world = self.generator.config();
        let mut rng = decoration_rng(world.world_seed(), coord);

        let populators = self.resolve_populators(chunk)?;
        let names: Vec<String> = populators.iter().map(|p| p.name().to_string()).collect();
        self.emit(GenerationEvent::PopulateChunkPre {
            coord,
            populators: names.clone(),
        });

        let mut ctx = DecorationContext::new();
        for populator in &populators {
            tracing::trace!(%coord, populator = populator.name(), "decorating");
            populator.populate(world, chunk, &mut rng, &mut ctx)?;
        }

        chunk.populated = true;
        chunk.generate_skylight_map();
        let flags = ctx.into_flags();
        tracing::debug!(%coord, populators = names.len(), flags = ?flags, "chunk populated");
        self.emit(GenerationEvent::PopulateChunkPost {
            coord,
            flags: flags.clone(),
        });

        Ok(DecorationReport {
            populators: names,
            flags,
        })
    }

    /// Generates and populates a chunk in one go.
    ///
    /// # Errors
    ///
    /// Returns the first error of either phase.
    pub fn generate(&self, coord: ChunkCoord) -> GenResult<(Chunk, DecorationReport)> {
        let mut chunk = self.provide_chunk(coord)?;
        let report = self.populate(&mut chunk)?;
        Ok((chunk, report))
    }
}

impl std::fmt::Debug for ChunkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkProvider")
            .field("generator", &self.generator)
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}
