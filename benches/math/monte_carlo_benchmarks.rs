use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use numlab::math::monte_carlo::{estimate_integral_with_rng, MonteCarloConfig};
use numlab::math::quadrature::quad;

fn bench_hit_or_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_or_miss");
    group.sample_size(20);

    for &samples in &[10_000usize, 100_000, 1_000_000] {
        let config = MonteCarloConfig::with_samples(samples);

        group.bench_with_input(BenchmarkId::new("sequential", samples), &config, |b, config| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(42);
                estimate_integral_with_rng(|x| x * x, 0.0, black_box(2.0), config, &mut rng)
            })
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", samples), &config, |b, config| {
            b.iter(|| {
                numlab::math::monte_carlo::par_estimate_integral(
                    |x| x * x,
                    0.0,
                    black_box(2.0),
                    config,
                    42,
                )
            })
        });
    }

    group.finish();
}

fn bench_quadrature(c: &mut Criterion) {
    c.bench_function("quad_x_squared", |b| {
        b.iter(|| quad(|x| x * x, 0.0, black_box(2.0)))
    });
}

criterion_group!(benches, bench_hit_or_miss, bench_quadrature);
criterion_main!(benches);
