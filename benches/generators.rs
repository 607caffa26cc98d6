//! Benchmarks for the pattern generators, orbit generation and the canvas tick.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kaleido::attractor::{generate_orbit, HopalongParams, OrbitColoring, OrbitSettings, Tier};
use kaleido::config::PatternMode;
use kaleido::effects::constellation_edges;
use kaleido::input::InputEvent;
use kaleido::pattern::{
    dragon_curve, mandelbrot_escape, recursive_branch, sacred_geometry_points, sierpinski, spiral_points,
};
use kaleido::render::{DrawList, NullSurface};
use kaleido::simulation::Simulation;

fn bench_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("patterns");
    let center = Vec2::new(400.0, 300.0);

    group.bench_function("mandelbrot_grid", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for row in 0..10 {
                for col in 0..10 {
                    let x = -2.0 + 3.0 * col as f32 / 9.0;
                    let y = -1.5 + 3.0 * row as f32 / 9.0;
                    total += mandelbrot_escape(black_box(x), black_box(y), 20);
                }
            }
            total
        })
    });

    group.bench_function("spiral", |b| b.iter(|| spiral_points(black_box(center), 100)));
    group.bench_function("sacred", |b| b.iter(|| sacred_geometry_points(black_box(center), 50.0, 2)));
    group.bench_function("branch", |b| b.iter(|| recursive_branch(black_box(center), 40.0, 0, 3)));

    for depth in [4u32, 6, 8] {
        group.bench_with_input(BenchmarkId::new("sierpinski", depth), &depth, |b, &depth| {
            b.iter(|| sierpinski(Vec2::ZERO, Vec2::new(200.0, 0.0), Vec2::new(100.0, 173.2), 0, depth))
        });
        group.bench_with_input(BenchmarkId::new("dragon", depth), &depth, |b, &depth| {
            b.iter(|| dragon_curve(black_box(Vec2::ZERO), 200.0, 0.0, 0, depth))
        });
    }

    group.finish();
}

fn bench_orbits(c: &mut Criterion) {
    let mut group = c.benchmark_group("orbits");
    group.sample_size(20);

    for tier in [Tier::Low, Tier::Medium] {
        let settings = OrbitSettings::from_tier(tier);
        group.bench_with_input(BenchmarkId::new("generate", settings.points), &settings, |b, settings| {
            let mut rng = StdRng::seed_from_u64(7);
            let params = HopalongParams::random(&mut rng);
            let coloring = OrbitColoring::default();
            b.iter(|| generate_orbit(&params, 0, settings, &coloring, &mut rng))
        });
    }

    group.finish();
}

fn bench_canvas(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas");

    group.bench_function("tick_300_particles", |b| {
        b.iter_batched(
            || {
                let mut sim = Simulation::new(1280.0, 720.0)
                    .with_mode(PatternMode::Particles)
                    .with_seed(1);
                for i in 0..10 {
                    sim.push_input(InputEvent::Click(Vec2::new(100.0 + i as f32 * 100.0, 360.0)));
                }
                sim.tick(0.0, &mut NullSurface);
                sim
            },
            |mut sim| {
                let mut list = DrawList::new();
                sim.tick(0.016, &mut list);
                list.len()
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("constellation_edges", |b| {
        let mut sim = Simulation::new(1280.0, 720.0)
            .with_mode(PatternMode::Constellation)
            .with_seed(2);
        for i in 0..20 {
            sim.push_input(InputEvent::KeyPress(kaleido::input::KeyCode::Character(
                char::from(b'a' + i as u8),
            )));
        }
        sim.tick(0.0, &mut NullSurface);
        b.iter(|| constellation_edges(black_box(sim.particles())))
    });

    group.finish();
}

criterion_group!(benches, bench_patterns, bench_orbits, bench_canvas);
criterion_main!(benches);
