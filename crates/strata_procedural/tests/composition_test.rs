//! # Composition Integration Tests
//!
//! Strategy slots, settings validation, populator ordering and flag
//! gating, exercised through the public API only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use strata_procedural::populator::{flags, FilteredPopulator, PopulatorKind};
use strata_procedural::settings::BiomeGenerationSettingsBuilder;
use strata_procedural::{
    gravity_suppressed, BiomeGenerationSettings, BiomeType, Block, Chunk, ChunkCoord, ChunkProvider, ChunkRng,
    DecorationContext, GenResult, GenerationError, GenerationPopulator, GenerationTarget, GroundCoverLayer,
    Populator, SeededAmount, SingleBiomeGenerator, StrategySlot, WorldConfig, WorldGenerator, CHUNK_HEIGHT,
    CHUNK_SIZE,
};
use strata_procedural::populator::GenerationPopulatorKind;

/// Fills every block with stone.
struct SolidStone;

impl GenerationPopulator for SolidStone {
    fn kind(&self) -> GenerationPopulatorKind {
        GenerationPopulatorKind::Terrain
    }

    fn name(&self) -> &str {
        "solid_stone"
    }

    fn populate(&self, target: &mut GenerationTarget<'_>, _rng: &mut ChunkRng) -> GenResult<()> {
        for x in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for y in 0..CHUNK_HEIGHT {
                    target.volume.set(x, y, z, Block::STONE);
                }
            }
        }
        Ok(())
    }
}

/// Sets a flag.
struct Marker(&'static str);

impl Populator for Marker {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Custom
    }

    fn name(&self) -> &str {
        "marker"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        _chunk: &mut Chunk,
        _rng: &mut ChunkRng,
        ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        ctx.set_flag(self.0);
        Ok(())
    }
}

/// Counts calls and records whether gravity was suppressed.
#[derive(Default)]
struct Recorder {
    calls: AtomicUsize,
    suppressed: AtomicUsize,
    fail: bool,
}

impl Populator for Recorder {
    fn kind(&self) -> PopulatorKind {
        PopulatorKind::Custom
    }

    fn name(&self) -> &str {
        "recorder"
    }

    fn populate(
        &self,
        _world: &WorldConfig,
        _chunk: &mut Chunk,
        _rng: &mut ChunkRng,
        _ctx: &mut DecorationContext,
    ) -> GenResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if gravity_suppressed() {
            self.suppressed.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail {
            return Err(GenerationError::Populator {
                populator: "recorder".to_string(),
                reason: "requested failure".to_string(),
            });
        }
        Ok(())
    }
}

fn bare_settings() -> BiomeGenerationSettings {
    BiomeGenerationSettings::builder()
        .ground_cover_layers(&[])
        .generation_populators(&[])
        .populators(&[])
        .build()
        .expect("complete builder")
}

/// A plains-only world with empty plains settings.
fn plains_world() -> WorldGenerator {
    let mut generator = WorldGenerator::new(WorldConfig::with_seed(42));
    generator
        .set_biome_generator(Arc::new(SingleBiomeGenerator::new(BiomeType::Plains)), "tests")
        .expect("fresh slot");
    generator.set_biome_settings(BiomeType::Plains, bare_settings());
    generator
}

/// Test: The second biome generator override fails and keeps the first.
#[test]
fn test_biome_generator_single_writer() {
    let mut generator = WorldGenerator::new(WorldConfig::default());
    generator
        .set_biome_generator(Arc::new(SingleBiomeGenerator::new(BiomeType::Desert)), "first")
        .expect("first override wins");

    let err = generator
        .set_biome_generator(Arc::new(SingleBiomeGenerator::new(BiomeType::Forest)), "second")
        .expect_err("second override is rejected");
    match err {
        GenerationError::OverrideConflict { slot, owner, .. } => {
            assert_eq!(slot, StrategySlot::BiomeGenerator);
            assert_eq!(owner, "first");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let provider = ChunkProvider::new(generator);
    let chunk = provider.provide_chunk(ChunkCoord::new(0, 0)).expect("generates");
    assert!(chunk.biome_ids().iter().all(|&id| id == BiomeType::Desert.id()));
}

/// Test: The second base generator override fails.
#[test]
fn test_base_generator_single_writer() {
    let mut generator = WorldGenerator::new(WorldConfig::default());
    generator
        .set_base_generation_populator(Arc::new(SolidStone), "first")
        .expect("first override wins");
    assert!(generator
        .set_base_generation_populator(Arc::new(SolidStone), "second")
        .is_err());
    assert_eq!(generator.base_generation_populator().name(), "solid_stone");
}

/// Test: Build fails until every list is assigned, and on inverted heights.
#[test]
fn test_builder_validation() {
    let mut builder = BiomeGenerationSettingsBuilder::new();
    assert!(matches!(builder.build(), Err(GenerationError::InvalidSettings { .. })));

    builder.ground_cover_layers(&[]).populators(&[]);
    assert!(builder.build().is_err(), "generation populators missing");

    builder.generation_populators(&[]);
    let settings = builder.build().expect("complete");
    assert!(settings.min_height() <= settings.max_height());

    builder.min_height(0.5).max_height(0.2);
    assert!(builder.build().is_err(), "max below min");
}

/// Test: One fixed layer of depth 3 over a solid stone column.
#[test]
fn test_ground_cover_scenario() {
    let mut generator = plains_world();
    generator
        .set_base_generation_populator(Arc::new(SolidStone), "tests")
        .expect("fresh slot");
    let layer = GroundCoverLayer::new(Block::DIRT, SeededAmount::fixed(3.0));
    let settings = BiomeGenerationSettings::builder()
        .ground_cover_layers(&[layer])
        .generation_populators(&[])
        .populators(&[])
        .build()
        .expect("complete builder");
    generator.set_biome_settings(BiomeType::Plains, settings);

    let provider = ChunkProvider::new(generator);
    let chunk = provider.provide_chunk(ChunkCoord::new(2, 2)).expect("generates");

    for (x, z) in [(0, 0), (7, 9), (15, 15)] {
        for y in CHUNK_HEIGHT - 3..CHUNK_HEIGHT {
            assert_eq!(chunk.get_block(x, y, z), Block::DIRT, "({x},{y},{z})");
        }
        for y in 5..CHUNK_HEIGHT - 3 {
            assert_eq!(chunk.get_block(x, y, z), Block::STONE, "({x},{y},{z})");
        }
        assert_eq!(chunk.get_block(x, 0, z), Block::BEDROCK);
    }
}

/// Test: Appending through the mutable accessor twice keeps both, in order.
#[test]
fn test_list_mutation_keeps_call_order() {
    let mut generator = WorldGenerator::new(WorldConfig::default());
    generator.populators_mut().push(Arc::new(Marker("A")));
    generator.populators_mut().push(Arc::new(Recorder::default()));

    let names: Vec<_> = generator.populators().iter().map(|p| p.name().to_string()).collect();
    assert_eq!(names, vec!["marker", "recorder"]);
    assert_eq!(generator.populators_of(PopulatorKind::Custom).len(), 2);
}

/// Test: A flag set earlier in the phase opens a later gate.
#[test]
fn test_flag_visible_later_in_phase() {
    let recorder = Arc::new(Recorder::default());
    let mut generator = plains_world();
    generator.populators_mut().push(Arc::new(Marker(flags::VILLAGE)));
    generator.populators_mut().push(Arc::new(
        FilteredPopulator::new(recorder.clone()).require_flag(flags::VILLAGE),
    ));
    let provider = ChunkProvider::new(generator);

    let (_, report) = provider.generate(ChunkCoord::new(0, 0)).expect("pipeline succeeds");
    assert_eq!(report.flags, vec![flags::VILLAGE.to_string()]);
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
}

/// Test: Flags do not carry over into the next chunk's phase.
#[test]
fn test_flags_reset_between_chunks() {
    let recorder = Arc::new(Recorder::default());
    let mut generator = plains_world();
    generator.populators_mut().push(Arc::new(
        FilteredPopulator::new(recorder.clone()).require_flag(flags::VILLAGE),
    ));
    generator.populators_mut().push(Arc::new(Marker(flags::VILLAGE)));
    let provider = ChunkProvider::new(generator);

    for x in 0..3 {
        let (_, report) = provider.generate(ChunkCoord::new(x, 0)).expect("pipeline succeeds");
        assert_eq!(report.flags, vec![flags::VILLAGE.to_string()]);
    }
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
}

/// Test: A failing populator aborts the phase and gravity comes back.
#[test]
fn test_gravity_restored_on_error() {
    let failing = Arc::new(Recorder {
        fail: true,
        ..Recorder::default()
    });
    let after = Arc::new(Recorder::default());
    let mut generator = plains_world();
    generator.populators_mut().push(failing.clone());
    generator.populators_mut().push(after.clone());
    let provider = ChunkProvider::new(generator);

    let mut chunk = provider.provide_chunk(ChunkCoord::new(0, 0)).expect("generates");
    assert!(!gravity_suppressed());
    let err = provider.populate(&mut chunk).expect_err("recorder fails");

    assert!(matches!(err, GenerationError::Populator { .. }));
    assert_eq!(failing.suppressed.load(Ordering::SeqCst), 1, "suppressed while running");
    assert_eq!(after.calls.load(Ordering::SeqCst), 0, "later populators skipped");
    assert!(!gravity_suppressed(), "restored after the error");
    assert!(!chunk.populated);
}

/// Test: Overrides given at construction win over the registry.
#[test]
fn test_construction_overrides_win() {
    let generator = WorldGenerator::new(WorldConfig::default())
        .with_biome_overrides([(BiomeType::Forest, bare_settings())]);
    let forest = generator.biome_settings(BiomeType::Forest).expect("override");
    assert!(forest.populators().is_empty());

    let plains = generator.biome_settings(BiomeType::Plains).expect("registry default");
    assert!(!plains.populators().is_empty());
}
