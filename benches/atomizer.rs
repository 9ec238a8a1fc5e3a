use clforge::atomizer::{Atomizer, CharacterAtomizer, GreedyAtomizer};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const KERNEL_SOURCE: &str = r#"
__kernel void saxpy(__global const float* x, __global float* y, const float a, const int n) {
    int i = get_global_id(0);
    if (i < n) {
        y[i] = a * x[i] + y[i];
    }
}
"#;

fn bench_greedy_atomize(c: &mut Criterion) {
    let atomizer = GreedyAtomizer::from_text(KERNEL_SOURCE).expect("seeded vocabulary covers the corpus");
    let mut group = c.benchmark_group("greedy_atomize");

    for repeats in &[1, 10, 100] {
        let corpus = KERNEL_SOURCE.repeat(*repeats);
        group.bench_with_input(BenchmarkId::from_parameter(repeats), repeats, |b, _| {
            b.iter(|| atomizer.atomize(black_box(&corpus)));
        });
    }
    group.finish();
}

fn bench_greedy_from_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("greedy_from_text");
    for repeats in &[1, 10, 100] {
        let corpus = KERNEL_SOURCE.repeat(*repeats);
        group.bench_with_input(BenchmarkId::from_parameter(repeats), repeats, |b, _| {
            b.iter(|| GreedyAtomizer::from_text(black_box(&corpus)));
        });
    }
    group.finish();
}

fn bench_character_atomize(c: &mut Criterion) {
    let atomizer = CharacterAtomizer::from_text(KERNEL_SOURCE);
    let mut group = c.benchmark_group("character_atomize");

    for repeats in &[1, 10, 100] {
        let corpus = KERNEL_SOURCE.repeat(*repeats);
        group.bench_with_input(BenchmarkId::from_parameter(repeats), repeats, |b, _| {
            b.iter(|| atomizer.atomize(black_box(&corpus)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_greedy_atomize,
    bench_greedy_from_text,
    bench_character_atomize
);
criterion_main!(benches);
