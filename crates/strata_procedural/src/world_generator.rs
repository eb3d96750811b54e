//! # World Generator
//!
//! Composition root of the pipeline: which biome generator, which base
//! terrain generator, which extra populators, and which settings each biome
//! uses.
//!
//! ## Single-writer slots
//!
//! The biome generator and the base generator can each be replaced once.
//! The first [`set_biome_generator`](WorldGenerator::set_biome_generator)
//! wins; a second call fails with [`GenerationError::OverrideConflict`]
//! naming the extension that got there first, and the installed strategy
//! stays in place.
//!
//! ## Biome settings
//!
//! Settings come from the override map when present, otherwise from the
//! [`BiomeRegistry`] on first request. Registry results are cached for the
//! life of the generator behind a mutex so concurrent chunks never build the
//! same biome twice.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::biome::{BiomeGenerator, BiomeType, ClimateBiomeGenerator};
use crate::config::WorldConfig;
use crate::error::{GenResult, GenerationError, StrategySlot};
use crate::populator::{GenerationPopulatorKind, PopulatorKind};
use crate::registry::{BiomeRegistry, DefaultBiomeRegistry};
use crate::settings::{BiomeGenerationSettings, SharedGenerationPopulator, SharedPopulator};
use crate::terrain::NoiseTerrainGenerator;

/// Who replaced a strategy slot, and with what.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverrideOwner {
    /// Extension that installed the strategy.
    pub owner: String,
    /// Name of the installed strategy.
    pub strategy: String,
}

/// Shared handle to a biome generator.
pub type SharedBiomeGenerator = Arc<dyn BiomeGenerator>;

/// Strategies, populator lists and biome settings of one world.
pub struct WorldGenerator {
    config: WorldConfig,
    biome_generator: SharedBiomeGenerator,
    biome_generator_owner: Option<OverrideOwner>,
    base_generator: SharedGenerationPopulator,
    base_generator_owner: Option<OverrideOwner>,
    generation_populators: Vec<SharedGenerationPopulator>,
    populators: Vec<SharedPopulator>,
    registry: Arc<dyn BiomeRegistry>,
    overrides: HashMap<BiomeType, Arc<BiomeGenerationSettings>>,
    settings_cache: Mutex<HashMap<BiomeType, Arc<BiomeGenerationSettings>>>,
}

impl WorldGenerator {
    /// Creates a generator with the climate biome generator, noise terrain,
    /// default biome registry and empty populator lists.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self::with_registry(config, Arc::new(DefaultBiomeRegistry::new()))
    }

    /// Like [`new`](Self::new) with another settings source.
    #[must_use]
    pub fn with_registry(config: WorldConfig, registry: Arc<dyn BiomeRegistry>) -> Self {
        let seed = config.world_seed();
        Self {
            biome_generator: Arc::new(ClimateBiomeGenerator::new(seed)),
            biome_generator_owner: None,
            base_generator: Arc::new(NoiseTerrainGenerator::new(seed, &config.terrain)),
            base_generator_owner: None,
            generation_populators: Vec::new(),
            populators: Vec::new(),
            registry,
            overrides: HashMap::new(),
            settings_cache: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Seeds the override map; overrides win over registry defaults.
    #[must_use]
    pub fn with_biome_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (BiomeType, BiomeGenerationSettings)>,
    ) -> Self {
        for (biome, settings) in overrides {
            self.overrides.insert(biome, Arc::new(settings));
        }
        self
    }

    /// World settings.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The installed biome generator.
    #[must_use]
    pub fn biome_generator(&self) -> &SharedBiomeGenerator {
        &self.biome_generator
    }

    /// Who replaced the biome generator, if anyone did.
    #[must_use]
    pub fn biome_generator_owner(&self) -> Option<&OverrideOwner> {
        self.biome_generator_owner.as_ref()
    }

    /// Replaces the biome generator. Succeeds once per world.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::OverrideConflict`] if the slot was already
    /// replaced; the installed generator is kept.
    pub fn set_biome_generator(
        &mut self,
        generator: SharedBiomeGenerator,
        owner: impl Into<String>,
    ) -> GenResult<()> {
        let strategy = generator.name().to_string();
        claim_slot(&mut self.biome_generator_owner, StrategySlot::BiomeGenerator, owner.into(), strategy)?;
        self.biome_generator = generator;
        Ok(())
    }

    /// The installed base generation populator.
    #[must_use]
    pub fn base_generation_populator(&self) -> &SharedGenerationPopulator {
        &self.base_generator
    }

    /// Who replaced the base generator, if anyone did.
    #[must_use]
    pub fn base_generation_populator_owner(&self) -> Option<&OverrideOwner> {
        self.base_generator_owner.as_ref()
    }

    /// Replaces the base generation populator. Succeeds once per world.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::OverrideConflict`] if the slot was already
    /// replaced; the installed generator is kept.
    pub fn set_base_generation_populator(
        &mut self,
        generator: SharedGenerationPopulator,
        owner: impl Into<String>,
    ) -> GenResult<()> {
        let strategy = generator.name().to_string();
        claim_slot(&mut self.base_generator_owner, StrategySlot::BaseGenerator, owner.into(), strategy)?;
        self.base_generator = generator;
        Ok(())
    }

    /// Global generation populators, in run order.
    #[must_use]
    pub fn generation_populators(&self) -> &[SharedGenerationPopulator] {
        &self.generation_populators
    }

    /// Mutable global generation populators.
    pub fn generation_populators_mut(&mut self) -> &mut Vec<SharedGenerationPopulator> {
        &mut self.generation_populators
    }

    /// Global decoration populators, in run order.
    #[must_use]
    pub fn populators(&self) -> &[SharedPopulator] {
        &self.populators
    }

    /// Mutable global decoration populators.
    pub fn populators_mut(&mut self) -> &mut Vec<SharedPopulator> {
        &mut self.populators
    }

    /// Global decoration populators of one kind, in run order.
    #[must_use]
    pub fn populators_of(&self, kind: PopulatorKind) -> Vec<SharedPopulator> {
        self.populators
            .iter()
            .filter(|p| p.kind() == kind)
            .cloned()
            .collect()
    }

    /// Global generation populators of one kind, in run order.
    #[must_use]
    pub fn generation_populators_of(&self, kind: GenerationPopulatorKind) -> Vec<SharedGenerationPopulator> {
        self.generation_populators
            .iter()
            .filter(|p| p.kind() == kind)
            .cloned()
            .collect()
    }

    /// Installs settings for `biome`, replacing any earlier override.
    pub fn set_biome_settings(&mut self, biome: BiomeType, settings: BiomeGenerationSettings) {
        self.overrides.insert(biome, Arc::new(settings));
    }

    /// Settings of `biome`: the override if any, else the cached registry
    /// default, built on first request.
    ///
    /// # Errors
    ///
    /// Propagates a registry validation failure. Nothing is cached then, so
    /// the next request tries again.
    pub fn biome_settings(&self, biome: BiomeType) -> GenResult<Arc<BiomeGenerationSettings>> {
        if let Some(settings) = self.overrides.get(&biome) {
            return Ok(Arc::clone(settings));
        }

        let mut cache = self.settings_cache.lock();
        if let Some(settings) = cache.get(&biome) {
            return Ok(Arc::clone(settings));
        }
        let settings = Arc::new(self.registry.init_settings(biome, &self.config)?);
        tracing::debug!(%biome, "biome settings initialised");
        cache.insert(biome, Arc::clone(&settings));
        Ok(settings)
    }

    /// Number of registry-built settings cached so far.
    #[must_use]
    pub fn cached_biome_count(&self) -> usize {
        self.settings_cache.lock().len()
    }
}

fn claim_slot(
    cell: &mut Option<OverrideOwner>,
    slot: StrategySlot,
    owner: String,
    strategy: String,
) -> GenResult<()> {
    if let Some(current) = cell {
        tracing::warn!(%slot, current = %current.owner, rejected = %owner, "strategy override rejected");
        return Err(GenerationError::OverrideConflict {
            slot,
            owner: current.owner.clone(),
            strategy: current.strategy.clone(),
        });
    }
    tracing::info!(%slot, %owner, %strategy, "strategy overridden");
    *cell = Some(OverrideOwner { owner, strategy });
    Ok(())
}

impl std::fmt::Debug for WorldGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldGenerator")
            .field("seed", &self.config.seed)
            .field("biome_generator", &self.biome_generator.name())
            .field("base_generator", &self.base_generator.name())
            .field("generation_populators", &self.generation_populators.len())
            .field("populators", &self.populators.len())
            .field("overrides", &self.overrides.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::VariableAmount;
    use crate::biome::SingleBiomeGenerator;
    use crate::populator::{DeadBushPopulator, DungeonPopulator, SnowPopulator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_biome_generator_single_writer() {
        let mut generator = WorldGenerator::new(WorldConfig::default());
        assert_eq!(generator.biome_generator().name(), "climate");

        generator
            .set_biome_generator(Arc::new(SingleBiomeGenerator::new(BiomeType::Desert)), "first")
            .expect("first override wins");
        let err = generator
            .set_biome_generator(Arc::new(SingleBiomeGenerator::new(BiomeType::Plains)), "second")
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::OverrideConflict {
                slot: StrategySlot::BiomeGenerator,
                owner: "first".into(),
                strategy: "single_biome".into(),
            }
        );
        println!("{err}");
        assert_eq!(generator.biome_generator_owner().map(|o| o.owner.as_str()), Some("first"));
    }

    #[test]
    fn test_base_generator_single_writer() {
        let mut generator = WorldGenerator::new(WorldConfig::default());
        let terrain = Arc::new(NoiseTerrainGenerator::new(
            generator.config().world_seed(),
            &generator.config().terrain,
        ));
        generator
            .set_base_generation_populator(terrain.clone(), "a")
            .expect("first override wins");
        assert!(generator.set_base_generation_populator(terrain, "b").is_err());
        assert_eq!(generator.base_generation_populator_owner().map(|o| o.owner.as_str()), Some("a"));
    }

    #[test]
    fn test_list_mutation_appends_in_order() {
        let mut generator = WorldGenerator::new(WorldConfig::default());
        generator.populators_mut().push(Arc::new(SnowPopulator::new()));
        generator.populators_mut().push(Arc::new(DungeonPopulator::new(1)));
        let names: Vec<_> = generator.populators().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["snow", "dungeon"]);
    }

    #[test]
    fn test_filter_by_kind_keeps_order() {
        let mut generator = WorldGenerator::new(WorldConfig::default());
        let list = generator.populators_mut();
        list.push(Arc::new(DungeonPopulator::new(1)));
        list.push(Arc::new(SnowPopulator::new()));
        list.push(Arc::new(DungeonPopulator::new(2)));
        list.push(Arc::new(DeadBushPopulator::new(VariableAmount::fixed(1.0))));

        let dungeons = generator.populators_of(PopulatorKind::Dungeon);
        assert_eq!(dungeons.len(), 2);
        assert!(generator.populators_of(PopulatorKind::Lake).is_empty());
        assert!(generator.generation_populators_of(GenerationPopulatorKind::Caves).is_empty());
    }

    struct CountingRegistry {
        calls: AtomicUsize,
    }

    impl BiomeRegistry for CountingRegistry {
        fn init_settings(&self, biome: BiomeType, world: &WorldConfig) -> GenResult<BiomeGenerationSettings> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            DefaultBiomeRegistry::new().init_settings(biome, world)
        }
    }

    #[test]
    fn test_settings_built_once_per_biome() {
        let registry = Arc::new(CountingRegistry {
            calls: AtomicUsize::new(0),
        });
        let generator = WorldGenerator::with_registry(WorldConfig::default(), registry.clone());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for biome in [BiomeType::Plains, BiomeType::Desert, BiomeType::Plains] {
                        generator.biome_settings(biome).expect("defaults are valid");
                    }
                });
            }
        });
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
        assert_eq!(generator.cached_biome_count(), 2);
    }

    #[test]
    fn test_override_wins_over_registry() {
        let custom = BiomeGenerationSettings::builder()
            .min_height(1.0)
            .max_height(2.0)
            .ground_cover_layers(&[])
            .generation_populators(&[])
            .populators(&[])
            .build()
            .expect("valid settings");
        let generator = WorldGenerator::new(WorldConfig::default())
            .with_biome_overrides([(BiomeType::Plains, custom)]);

        let plains = generator.biome_settings(BiomeType::Plains).expect("override");
        assert!((plains.min_height() - 1.0).abs() < f32::EPSILON);
        assert!(plains.populators().is_empty());
        assert_eq!(generator.cached_biome_count(), 0);
    }
}
