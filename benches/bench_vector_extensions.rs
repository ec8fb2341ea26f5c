use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array, Array1};
use ndarray_tables::vector_extensions::VectorExtensions;
use rand::{distr::Uniform, Rng};

use rand_extensions::{rng, RandArray};


fn run(arr: &Array1<f64>, query: &Array1<f64>) {
    let mut last = 0;
    for &x in query {
        last = arr.find_index(last, x);
    }
}

fn bunched_linspace() -> Array1<f64> {
    let mut arr: Vec<f64> =
        Vec::from_iter(Array::linspace(0.0, 1.0, 20).into_iter().flat_map(|x| {
            rng(42)
                .sample_iter(Uniform::new_inclusive(-0.001, 0.001).unwrap())
                .take(5)
                .map(move |noise| x + noise)
        }));
    arr.sort_by(|a, b| a.partial_cmp(b).unwrap());
    arr.dedup();
    Array::from(arr)
}

fn noisy_linspace() -> Array1<f64> {
    let mut arr = Array::linspace(0.0, 1.0, 100);
    arr.iter_mut()
        .zip(rng(42).sample_iter(Uniform::new(-0.002, 0.002).unwrap()))
        .for_each(|(val, noise)| {
            *val += noise;
        });
    arr
}

fn bench_find_index(c: &mut Criterion) {
    let query = Array1::from_rand(1000, (-0.1, 1.1), 69);

    let arr = black_box(Array::linspace(0.0, 1.0, 100));
    c.bench_function("Linspaced", |b| {
        b.iter(|| run(&arr, &query));
    });

    let arr = Array1::from_rand_ordered(100, (0.0, 1.0), 42);
    c.bench_function("Uniform rng", |b| {
        b.iter(|| run(&arr, &query));
    });

    let arr = bunched_linspace();
    c.bench_function("Linspace bunched", |b| {
        b.iter(|| run(&arr, &query));
    });

    let arr = noisy_linspace();
    c.bench_function("Linspace noisy", |b| {
        b.iter(|| run(&arr, &query));
    });

    let arr = Array::logspace(2.0, 0.0, 8.0, 100);
    let log_query = Array1::from_rand(1000, (0.95, 256.5), 69);
    c.bench_function("Logspaced", |b| {
        b.iter(|| run(&arr, &log_query));
    });

    // time stepping, most queries hit the memoized interval
    let arr = Array::linspace(0.0, 1.0, 100);
    let steps = Array::linspace(0.0, 1.0, 10_000);
    c.bench_function("Linspaced sequential", |b| {
        b.iter(|| run(&arr, &steps));
    });
}

criterion_group!(benches, bench_find_index);
criterion_main!(benches);
