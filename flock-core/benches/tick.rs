/*
 * Flock tick benchmark
 *
 * Measures one full tick for several population sizes. The neighbor scan is
 * quadratic, so doubling the flock should roughly quadruple the time.
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flock_core::{FlockConfig, FlockStd, Spawn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for num_boids in [50, 200, 500, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(num_boids), num_boids, |b, &n| {
            let mut rng = StdRng::seed_from_u64(n as u64);
            let mut flock: FlockStd =
                FlockStd::initialize(n, &Spawn::default(), FlockConfig::default(), &mut rng);

            b.iter(|| {
                flock.tick();
                black_box(flock.boids());
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(10)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1));
    targets = bench_tick
}

criterion_main!(benches);
