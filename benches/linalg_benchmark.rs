//! Benchmarks for the numerical core: QR, eigendecomposition, Gram matrices

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kernelmachines::{GaussianKernel, Kernel, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_symmetric(n: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let v = rng.gen_range(-1.0..1.0);
            m[(i, j)] = v;
            m[(j, i)] = v;
        }
        m[(i, i)] += n as f64;
    }
    m
}

fn random_samples(count: usize, dim: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

fn bench_qr(c: &mut Criterion) {
    let small = random_symmetric(32, 1);
    let large = random_symmetric(96, 2);

    c.bench_function("qr_gram_schmidt_32", |b| {
        b.iter(|| black_box(&small).qr().unwrap())
    });
    c.bench_function("qr_givens_96", |b| {
        b.iter(|| black_box(&large).qr().unwrap())
    });
}

fn bench_eigen(c: &mut Criterion) {
    let small = random_symmetric(32, 3);
    let large = random_symmetric(96, 4);

    c.bench_function("eigen_qr_iteration_32", |b| {
        b.iter(|| black_box(&small).eigen_symmetric().unwrap())
    });
    c.bench_function("eigen_jacobi_96", |b| {
        b.iter(|| black_box(&large).eigen_symmetric().unwrap())
    });
}

fn bench_gram_matrix(c: &mut Criterion) {
    let kernel = GaussianKernel::new(0.1);
    let samples = random_samples(200, 16, 5);

    c.bench_function("gram_matrix_gaussian_200", |b| {
        b.iter(|| kernel.gram_matrix(black_box(&samples)))
    });
}

criterion_group!(benches, bench_qr, bench_eigen, bench_gram_matrix);
criterion_main!(benches);
