//! Benchmarks for the CPU-side pipeline stages.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use morphfall::extract::GridExtractor;
use morphfall::integrate::StepParams;
use morphfall::particle::{Particle, ParticleInfo};
use morphfall::pipeline::{FrameInput, Pipeline};
use morphfall::shape::{ShapeField, ShapeLibrary};
use morphfall::{emit, integrate, PipelineConfig, SurfaceExtractor, TriangleVertex};

const DT: f32 = 1.0 / 60.0;

fn flat_triangles(count: usize) -> Vec<TriangleVertex> {
    (0..count * 3)
        .map(|i| {
            TriangleVertex::new(
                Vec3::new((i / 3) as f32 * 1e-4, (i % 3) as f32 * 1e-4, 0.5),
                Vec3::Y,
            )
        })
        .collect()
}

fn falling_particles(count: usize) -> Vec<Particle> {
    (0..count)
        .map(|i| Particle {
            position: Vec3::new(0.0, 2.0 + i as f32 * 1e-3, 0.0),
            velocity: Vec3::new(0.0, -0.5, 0.0),
            info: ParticleInfo {
                life: 0.5 + (i % 100) as f32 * 5e-3,
                bounce: 0.0,
            },
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let field = ShapeLibrary.field_at(0.0);

    for size in [32u32, 64] {
        group.bench_with_input(BenchmarkId::new("grid", size), &size, |b, &size| {
            let mut extractor = GridExtractor::new([size, size, size]);
            b.iter(|| {
                extractor.build(black_box(&field), 0.001).unwrap();
                black_box(extractor.vertex_count())
            })
        });
    }

    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");

    for triangles in [3_000usize, 30_000] {
        let vertices = flat_triangles(triangles);
        group.bench_with_input(
            BenchmarkId::new("stride_sample", triangles),
            &vertices,
            |b, vertices| {
                let mut slot = Vec::new();
                b.iter(|| {
                    slot.clear();
                    black_box(emit::run(vertices, 500, 7, &mut slot, 20_000))
                })
            },
        );
    }

    group.finish();
}

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    let field = ShapeField::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, -0.64]);
    let params = StepParams {
        dt: DT,
        iso_level: 0.001,
        gravity: 1.5,
        death_age: 3.0,
    };

    for count in [2_000usize, 20_000] {
        let particles = falling_particles(count);
        group.bench_with_input(
            BenchmarkId::new("euler_step", count),
            &particles,
            |b, particles| {
                let mut slot = Vec::new();
                b.iter(|| {
                    slot.clear();
                    black_box(integrate::run(particles, &field, &params, &mut slot, 20_000))
                })
            },
        );
    }

    group.finish();
}

fn bench_full_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    group.sample_size(20);

    group.bench_function("step_48_cube", |b| {
        let config = PipelineConfig::default().with_cubic_grid(48);
        let mut pipeline = Pipeline::new(config.clone()).unwrap();
        let mut extractor = GridExtractor::new(config.grid);
        let mut t = 0.01;
        b.iter(|| {
            let report = pipeline
                .step(&mut extractor, FrameInput { t, dt: DT })
                .unwrap();
            t += DT;
            black_box(report)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_extract,
    bench_emit,
    bench_integrate,
    bench_full_frame
);
criterion_main!(benches);
