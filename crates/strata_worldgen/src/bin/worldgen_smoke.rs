//! Smoke run of the generator: builds one chunk per level, walks the mobs for
//! a few seconds of simulated time and prints an ASCII map.
//!
//! Usage: `worldgen_smoke [catalog.toml] [config.toml]`
//!
//! Set `RUST_LOG=strata_worldgen=debug` to see per-pass timings.

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_catalog::TypeCatalog;
use strata_core::{Coord, Region, Volume};
use strata_worldgen::{GenerationStatus, GeneratorConfig, WorldGenerator};

const CHUNK: Region = Region::new(0, 0, 60, 30);
const FRAME_MS: u32 = 100;
const FRAMES: u32 = 100;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let catalog = match args.next() {
        Some(path) => TypeCatalog::load(path)?,
        None => TypeCatalog::bundled()?,
    };
    let config = match args.next() {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::seeded(42),
    };

    let generator = WorldGenerator::new(Arc::new(catalog), config)?;
    let depth = generator.catalog().depth();

    println!("===========================================");
    println!("STRATA worldgen smoke run");
    println!("===========================================");
    println!("Seed: {}  Depth: {}  Chunk: {:?}", generator.seed().value(), depth, CHUNK);

    match generator.generate_chunk(&Volume::new(CHUNK, 0..depth))? {
        GenerationStatus::Completed(summary) => {
            println!(
                "Generated {} cells, {} objects, {} mobs in {:?}",
                summary.cells, summary.objects, summary.mobs, summary.elapsed
            );
        }
        GenerationStatus::Busy => return Err("generator busy".into()),
    }

    let simulation = generator.simulation();
    let store = generator.store();
    let mut rng = ChaCha8Rng::seed_from_u64(generator.seed().value());
    let mut stepped = 0;
    for _ in 0..FRAMES {
        simulation.tick(store, FRAME_MS, &mut rng);
        stepped += simulation.step(store).stepped;
        simulation.settle(store, 0.5);
        store.advance_animations(FRAME_MS);
    }
    println!("Mob steps over {} ms: {}", FRAMES * FRAME_MS, stepped);

    for level in 0..depth {
        println!();
        println!("--- level {level} ---");
        print_map(&generator, level);

        let counts = generator.counts_in_range(level, CHUNK);
        print_counts("biomes", &counts.biomes);
        print_counts("terrains", &counts.terrains);
        print_counts("objects", &counts.objects);
    }
    Ok(())
}

/// Biome initials, `*` for objects, `@` for mobs, `#` for blocked cells.
fn print_map(generator: &WorldGenerator, level: u32) {
    let store = generator.store();
    for y in CHUNK.y..CHUNK.y_end() {
        let row: String = (CHUNK.x..CHUNK.x_end())
            .map(|x| {
                let coord = Coord::new(level, x, y);
                if !store.mobs_at(coord).is_empty() {
                    '@'
                } else if store.has_objects(coord) {
                    '*'
                } else if !store.is_passable(coord) {
                    '#'
                } else {
                    store
                        .read_biome(coord)
                        .and_then(|cell| cell.biome.name.chars().next())
                        .unwrap_or(' ')
                }
            })
            .collect();
        println!("{row}");
    }
}

fn print_counts(label: &str, counts: &BTreeMap<Arc<str>, u32>) {
    let line: Vec<String> = counts.iter().map(|(name, n)| format!("{name}={n}")).collect();
    println!("{label:>9}: {}", line.join(" "));
}
