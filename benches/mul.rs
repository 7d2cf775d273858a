use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use zmat::{Key, Mat};

/// Generate a random sparse f64 matrix with `nnz` entries drawn from an
/// `extent` x `extent` coordinate range.
fn random_mat(nnz: usize, extent: u32, seed: u64) -> Mat<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let entries = (0..nnz)
        .map(|_| {
            let key = Key::new(rng.random_range(0..extent), rng.random_range(0..extent));
            (key, rng.random::<f64>() + 0.5)
        })
        .collect();
    Mat::from_entries(entries)
}

fn bench_mul(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_mul");

    for &nnz in &[100, 1_000, 5_000] {
        let x = random_mat(nnz, 1 << 12, 42);
        let y = random_mat(nnz, 1 << 12, 43);
        group.bench_with_input(BenchmarkId::new("mul", nnz), &nnz, |b, _| {
            b.iter(|| x.mul(&y));
        });
    }

    group.finish();
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_add");

    for &nnz in &[1_000, 10_000, 100_000] {
        let x = random_mat(nnz, 1 << 16, 42);
        let y = random_mat(nnz, 1 << 16, 43);
        group.bench_with_input(BenchmarkId::new("add", nnz), &nnz, |b, _| {
            b.iter(|| x.add(&y));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mul, bench_add);
criterion_main!(benches);
