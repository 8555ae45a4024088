//! Benchmark for chunk generation throughput.
//!
//! Every iteration generates a fresh region, so placement never short-cuts
//! on cells written by an earlier iteration.
//!
//! Run with: cargo bench --package strata_worldgen --bench chunk_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_catalog::TypeCatalog;
use strata_core::{Region, Volume};
use strata_worldgen::{GeneratorConfig, WorldGenerator};

fn generator(workers: usize) -> WorldGenerator {
    let catalog = Arc::new(TypeCatalog::bundled().expect("bundled catalog"));
    let mut config = GeneratorConfig::seeded(42);
    config.worker_count = workers;
    WorldGenerator::new(catalog, config).expect("generator")
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let gen = generator(0);

    let mut group = c.benchmark_group("single_chunk");
    group.sample_size(10);
    group.throughput(Throughput::Elements(100 * 100));
    group.bench_function("100x100_fresh_region", |b| {
        let mut offset = 0i32;
        b.iter(|| {
            offset += 100;
            let chunk = Volume::single_level(0, Region::new(offset, 0, 100, 100));
            black_box(gen.generate_chunk(&chunk).expect("generation"))
        });
    });
    group.finish();
}

fn benchmark_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");
    group.sample_size(10);
    group.throughput(Throughput::Elements(150 * 150));

    for workers in [1usize, 2, 4, 8] {
        let gen = generator(workers);
        group.bench_function(format!("{workers}_workers"), |b| {
            let mut offset = 0i32;
            b.iter(|| {
                offset += 150;
                let chunk = Volume::single_level(0, Region::new(0, offset, 150, 150));
                black_box(gen.generate_chunk(&chunk).expect("generation"))
            });
        });
    }
    group.finish();
}

fn benchmark_all_levels(c: &mut Criterion) {
    let gen = generator(0);
    let depth = gen.catalog().depth();

    let mut group = c.benchmark_group("all_levels");
    group.sample_size(10);
    group.throughput(Throughput::Elements(u64::from(depth) * 64 * 64));
    group.bench_function("64x64_every_level", |b| {
        let mut offset = 0i32;
        b.iter(|| {
            offset -= 64;
            let chunk = Volume::new(Region::new(offset, offset, 64, 64), 0..depth);
            black_box(gen.generate_chunk(&chunk).expect("generation"))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_chunk,
    benchmark_worker_scaling,
    benchmark_all_levels,
);
criterion_main!(benches);
