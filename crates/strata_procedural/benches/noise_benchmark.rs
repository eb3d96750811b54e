//! Benchmark for the noise sources behind density and ground cover.
//!
//! Run with: cargo bench --package strata_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::noise::{OctavePerlin, PerlinNoise, SimplexNoise, WorldSeed};
use strata_procedural::terrain::{DensityField, LatticeHeights, LATTICE_XZ};
use strata_procedural::{ChunkCoord, TerrainConfig};

fn benchmark_simplex_octaved(c: &mut Criterion) {
    let noise = SimplexNoise::new(WorldSeed::new(42));

    c.bench_function("simplex_octaved_4", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.octaved(black_box(x), black_box(x * 0.7), 4, 0.5, 2.0))
        });
    });
}

fn benchmark_perlin_3d(c: &mut Criterion) {
    let noise = PerlinNoise::new(WorldSeed::new(42));

    let mut group = c.benchmark_group("perlin_3d");
    group.throughput(Throughput::Elements(100_000));
    group.sample_size(10);
    group.bench_function("100k_samples", |b| {
        b.iter(|| {
            for i in 0..100_000 {
                let x = f64::from(i % 100) * 0.1;
                let y = f64::from((i / 100) % 100) * 0.1;
                let z = f64::from(i / 10_000) * 0.1;
                black_box(noise.sample(x, y, z));
            }
        });
    });
    group.finish();
}

fn benchmark_octave_perlin(c: &mut Criterion) {
    let noise = OctavePerlin::new(WorldSeed::new(42), 8);

    c.bench_function("octave_perlin_8", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.sample(black_box(x), black_box(x * 0.3), black_box(x * 0.7)))
        });
    });
}

fn benchmark_density_lattice(c: &mut Criterion) {
    let field = DensityField::new(WorldSeed::new(42), &TerrainConfig::default());
    let heights: LatticeHeights = [(0.1, 0.2); LATTICE_XZ * LATTICE_XZ];

    c.bench_function("density_lattice_per_chunk", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(field.sample(ChunkCoord::new(x, -x), &heights))
        });
    });
}

criterion_group!(
    benches,
    benchmark_simplex_octaved,
    benchmark_perlin_3d,
    benchmark_octave_perlin,
    benchmark_density_lattice
);
criterion_main!(benches);
