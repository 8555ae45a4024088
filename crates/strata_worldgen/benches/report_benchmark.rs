//! Benchmark for neighbourhood report sampling.
//!
//! Every placement and smoothing visit builds at least one report, so this
//! is the inner loop of generation.
//!
//! Run with: cargo bench --package strata_worldgen --bench report_benchmark

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_catalog::TypeCatalog;
use strata_core::{Region, Volume};
use strata_worldgen::{GeneratorConfig, NeighborhoodReport, WorldGenerator};

fn generated_world() -> WorldGenerator {
    let catalog = Arc::new(TypeCatalog::bundled().expect("bundled catalog"));
    let gen = WorldGenerator::new(catalog, GeneratorConfig::seeded(42)).expect("generator");
    gen.generate_chunk(&Volume::single_level(0, Region::new(0, 0, 100, 100)))
        .expect("generation");
    gen
}

fn benchmark_report_radius(c: &mut Criterion) {
    let gen = generated_world();
    let store = gen.store();

    let mut group = c.benchmark_group("report_radius");
    for radius in [1u32, 3, 5] {
        let side = u64::from(radius * 2 + 1);
        group.throughput(Throughput::Elements(side * side));
        group.bench_function(format!("radius_{radius}"), |b| {
            let mut i = 0i32;
            b.iter(|| {
                i = (i + 7) % 90;
                let report = NeighborhoodReport::around(store, 0, i + 5, 50 - i / 2, radius, 1);
                black_box(report.majority_biome().map(|biome| biome.weight))
            });
        });
    }
    group.finish();
}

fn benchmark_report_stride(c: &mut Criterion) {
    let gen = generated_world();
    let store = gen.store();
    let region = Region::new(0, 0, 100, 100);

    let mut group = c.benchmark_group("report_full_chunk");
    group.sample_size(20);
    for stride in [1u32, 4] {
        group.bench_function(format!("stride_{stride}"), |b| {
            b.iter(|| black_box(NeighborhoodReport::sample(store, 0, region, stride).cells_seen));
        });
    }
    group.finish();
}

fn benchmark_counts_in_range(c: &mut Criterion) {
    let gen = generated_world();

    c.bench_function("counts_in_range_50x50", |b| {
        b.iter(|| black_box(gen.counts_in_range(0, Region::new(25, 25, 50, 50))));
    });
}

criterion_group!(
    benches,
    benchmark_report_radius,
    benchmark_report_stride,
    benchmark_counts_in_range,
);
criterion_main!(benches);
