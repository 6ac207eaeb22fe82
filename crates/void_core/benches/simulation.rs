//! Frame loop benchmarks for void_core.
//!
//! Run with: `cargo bench -p void_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use void_test_utils::fixtures::{crowded_lane, fixed_f};

/// Steps crowded lanes of increasing size.
pub fn frame_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    for per_side in [10u32, 50, 200] {
        group.bench_with_input(
            BenchmarkId::new("crowded_lane", per_side),
            &per_side,
            |b, &per_side| {
                let template = crowded_lane(per_side, 42);
                b.iter_batched(
                    || template.clone(),
                    |mut game| {
                        for _ in 0..60 {
                            black_box(game.frame(fixed_f(1.0 / 60.0)));
                        }
                        game
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

/// Hashing cost, which debug builds pay every frame.
pub fn state_hash_benchmark(c: &mut Criterion) {
    let game = crowded_lane(200, 42);
    c.bench_function("state_hash_200", |b| b.iter(|| black_box(game.state_hash())));
}

criterion_group!(benches, frame_benchmark, state_hash_benchmark);
criterion_main!(benches);
