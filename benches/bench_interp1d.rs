use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array, Array1};
use ndarray_tables::{Interp1D, Smoothness};

use rand_extensions::{table_1d, RandArray};


fn bench_interp1d_value(c: &mut Criterion) {
    let table = table_1d(100, 1, 42);
    let query = Array1::from_rand(10_000, (0.0, 99.0), 123);

    for (name, smoothness) in [
        ("constant", Smoothness::ConstantSegments),
        ("linear", Smoothness::LinearSegments),
        ("akima", Smoothness::ContinuousDerivative),
    ] {
        let interp = Interp1D::builder(table.view())
            .smoothness(smoothness)
            .build()
            .unwrap();

        c.bench_function(&format!("1D {name} `value`"), |b| {
            b.iter(|| {
                for &x in &query {
                    interp.value(1, x).unwrap();
                }
            })
        });

        c.bench_function(&format!("1D {name} `derivative`"), |b| {
            b.iter(|| {
                for &x in &query {
                    interp.derivative(1, x, 1.0).unwrap();
                }
            })
        });
    }

    let interp = Interp1D::builder(table.view()).build().unwrap();
    let steps = Array::linspace(0.0, 99.0, 10_000);
    c.bench_function("1D linear `value` sequential", |b| {
        b.iter(|| {
            for &x in &steps {
                interp.value(1, x).unwrap();
            }
        })
    });
}

fn bench_interp1d_columns(c: &mut Criterion) {
    let table = table_1d(100, 5, 69);
    let interp = Interp1D::builder(table.view()).build().unwrap();
    let query = Array1::from_rand(10_000, (0.0, 99.0), 123);

    c.bench_function("1D columns `interp`", |b| {
        b.iter(|| {
            for &x in &query {
                interp.interp(x).unwrap();
            }
        })
    });

    let mut buffer = Array::zeros(5);
    c.bench_function("1D columns `interp_into`", |b| {
        b.iter(|| {
            for &x in &query {
                interp.interp_into(x, buffer.view_mut()).unwrap();
            }
        })
    });

    c.bench_function("1D columns `interp_array`", |b| {
        b.iter(|| {
            interp.interp_array(&query).unwrap();
        })
    });

    c.bench_function("1D columns akima `build`", |b| {
        b.iter(|| {
            Interp1D::builder(table.view())
                .smoothness(Smoothness::ContinuousDerivative)
                .build()
                .unwrap();
        })
    });
}

criterion_group!(benches, bench_interp1d_value, bench_interp1d_columns);
criterion_main!(benches);
