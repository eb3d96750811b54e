//! # STRATA Procedural Generation
//!
//! Deterministic chunked world generation for voxel worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and coordinate always produce the same chunk
//! 2. **Two phases**: Generate builds terrain alone, populate decorates it
//! 3. **Composable**: Biome source, base terrain and populators are strategies
//! 4. **Parallel**: Strategies are `Send + Sync`, every chunk owns its buffers
//!
//! ## Core Components
//!
//! - [`WorldGenerator`]: Composition root holding the active strategies
//! - [`ChunkProvider`]: Runs the generate and populate phases
//! - [`BiomeGenerationSettings`]: Ground cover and populators of one biome
//! - [`BiomeRegistry`]: Lazily supplies per-biome settings
//! - [`populator`]: Caves, ravines, villages, lakes, dungeons, vegetation,
//!   fauna, snow
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{install_default_populators, ChunkCoord, ChunkProvider, WorldConfig, WorldGenerator};
//!
//! let mut generator = WorldGenerator::new(WorldConfig::with_seed(42));
//! install_default_populators(&mut generator);
//! let provider = ChunkProvider::new(generator);
//!
//! let (chunk, report) = provider.generate(ChunkCoord::new(0, 0))?;
//! assert!(chunk.populated);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod amount;
pub mod biome;
pub mod chunk;
pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod noise;
pub mod persistence;
pub mod physics;
pub mod populator;
pub mod provider;
pub mod registry;
pub mod seeding;
pub mod settings;
pub mod terrain;
pub mod world_generator;

pub use amount::{SeededAmount, VariableAmount, WeightedTable};
pub use biome::{BiomeGenerator, BiomeType, ClimateBiomeGenerator, SingleBiomeGenerator, Species};
pub use chunk::{Block, BlockVolume, BiomeArea, Chunk, ChunkCoord, CHUNK_HEIGHT, CHUNK_SIZE};
pub use config::{FeatureConfig, TerrainConfig, WorldConfig};
pub use error::{GenResult, GenerationError, StrategySlot};
pub use events::{EventBus, EventReceiver, EventSender, GenerationEvent};
pub use factory::{install_default_populators, PopulatorFactory};
pub use noise::{SimplexNoise, WorldSeed};
pub use persistence::{ChunkSink, Lz4FileSink, MemorySink};
pub use physics::{gravity_suppressed, GravitySuppression};
pub use populator::{DecorationContext, GenerationPopulator, GenerationTarget, Populator};
pub use provider::{ChunkProvider, DecorationReport};
pub use registry::{BiomeRegistry, DefaultBiomeRegistry};
pub use seeding::ChunkRng;
pub use settings::{BiomeGenerationSettings, BlockSelector, GroundCoverLayer};
pub use terrain::{GroundCoverPass, NoiseTerrainGenerator};
pub use world_generator::{OverrideOwner, WorldGenerator};
