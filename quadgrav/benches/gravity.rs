//! Benchmarks for the force pass
//!
//! These benchmarks measure:
//! - Barnes–Hut against direct summation for growing body counts
//! - The cost of the opening angle on a fixed field
//! - Tree construction alone (bounds, inserts, aggregation)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use quadgrav::{scattered_system, Acceleration, BarnesHutGravity, DirectGravity, NVec2, Parameters};

fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("force_pass");
    let params = Parameters::default();

    for n in [250, 1000, 4000] {
        let bodies = scattered_system(n, 0);
        let mut out = vec![NVec2::zeros(); n];
        group.throughput(Throughput::Elements(n as u64));

        let mut bh = BarnesHutGravity::default();
        bh.parallel = false;
        group.bench_with_input(BenchmarkId::new("barnes_hut", n), &bodies, |b, bodies| {
            b.iter(|| bh.acceleration(black_box(bodies), &params, &mut out))
        });

        // Quadratic; skip the largest size
        if n <= 1000 {
            let mut direct = DirectGravity { parallel: false };
            group.bench_with_input(BenchmarkId::new("direct", n), &bodies, |b, bodies| {
                b.iter(|| direct.acceleration(black_box(bodies), &params, &mut out))
            });
        }
    }
    group.finish();
}

fn bench_theta(c: &mut Criterion) {
    let mut group = c.benchmark_group("opening_angle");
    let bodies = scattered_system(2000, 0);
    let mut out = vec![NVec2::zeros(); bodies.len()];
    let mut bh = BarnesHutGravity::default();
    bh.parallel = false;

    for theta in [0.1, 0.3, 0.5, 0.8, 1.2] {
        let params = Parameters { theta, ..Parameters::default() };
        group.bench_with_input(BenchmarkId::from_parameter(theta), &params, |b, params| {
            b.iter(|| bh.acceleration(&bodies, black_box(params), &mut out))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let params = Parameters::default();
    let bodies = scattered_system(4000, 0);
    let mut bh = BarnesHutGravity::default();

    c.bench_function("tree_build_4000", |b| {
        b.iter(|| bh.build_tree(black_box(&bodies), &params).node_count())
    });
}

criterion_group!(benches, bench_models, bench_theta, bench_build);
criterion_main!(benches);
