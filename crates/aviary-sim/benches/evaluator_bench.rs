use std::hint::black_box;

use aviary_sim::{
    Candidate, GenerationEvaluator, INPUT_SIZE, NullRenderer, PolicyId, SimConfig, SpriteSet,
};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

type ThresholdPolicy = Box<dyn FnMut(&[f32; INPUT_SIZE]) -> Vec<f32>>;

/// Flap when the bird is closer to the bottom of the gap than `bias` allows
fn population(size: usize) -> Vec<Candidate<ThresholdPolicy>> {
    (0..size)
        .map(|i| {
            let bias = 60.0 + i as f32;
            let policy: ThresholdPolicy = Box::new(move |inputs: &[f32; INPUT_SIZE]| {
                vec![if inputs[2] < bias { 1.0 } else { 0.0 }]
            });
            Candidate::new(PolicyId(i as u64), policy)
        })
        .collect()
}

fn bench_ticks(c: &mut Criterion) {
    let config = SimConfig::default();
    let sprites = SpriteSet::procedural();

    let mut group = c.benchmark_group("evaluator");
    for size in [1usize, 50, 200] {
        group.bench_function(format!("100_ticks_{size}_agents"), |b| {
            b.iter(|| {
                let mut evaluator = GenerationEvaluator::new(
                    &config,
                    &sprites,
                    1,
                    population(size),
                    Box::new(Xoshiro256StarStar::seed_from_u64(42)),
                );
                for _ in 0..100 {
                    if evaluator.step(&mut NullRenderer).is_err() {
                        break;
                    }
                }
                black_box(evaluator.finish())
            });
        });
    }
    group.finish();
}

fn bench_collision(c: &mut Criterion) {
    let sprites = SpriteSet::procedural();
    let index = aviary_sim::CollisionIndex::new(&sprites);
    let agent = aviary_sim::Agent::new(230.0, 300.0);
    let obstacle = aviary_sim::Obstacle::new(200.0, 310.0, 200.0);

    c.bench_function("collision_overlap", |b| {
        b.iter(|| black_box(index.overlaps(black_box(&agent), black_box(&obstacle))))
    });
}

criterion_group!(benches, bench_ticks, bench_collision);
criterion_main!(benches);
