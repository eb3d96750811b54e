//! Benchmark for the two chunk phases.
//!
//! Run with: cargo bench --package strata_procedural --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{install_default_populators, ChunkCoord, ChunkProvider, WorldConfig, WorldGenerator};

fn provider() -> ChunkProvider {
    let mut generator = WorldGenerator::new(WorldConfig::with_seed(42));
    install_default_populators(&mut generator);
    ChunkProvider::new(generator)
}

fn benchmark_generate_phase(c: &mut Criterion) {
    let provider = provider();

    c.bench_function("generate_phase", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(provider.provide_chunk(ChunkCoord::new(coord, coord / 2)))
        });
    });
}

fn benchmark_populate_phase(c: &mut Criterion) {
    let provider = provider();
    let base = provider
        .provide_chunk(ChunkCoord::new(3, 7))
        .expect("default pipeline generates");

    c.bench_function("populate_phase", |b| {
        b.iter(|| {
            let mut chunk = base.clone();
            black_box(provider.populate(&mut chunk))
        });
    });
}

fn benchmark_chunk_grid(c: &mut Criterion) {
    let provider = provider();

    let mut group = c.benchmark_group("chunk_grid");
    group.sample_size(10);
    // 8x8 chunks = 128x128 blocks
    group.throughput(Throughput::Elements(8 * 8));
    group.bench_function("8x8_generate_and_populate", |b| {
        b.iter(|| {
            for z in 0..8 {
                for x in 0..8 {
                    black_box(provider.generate(ChunkCoord::new(x, z)));
                }
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_generate_phase,
    benchmark_populate_phase,
    benchmark_chunk_grid
);
criterion_main!(benches);
