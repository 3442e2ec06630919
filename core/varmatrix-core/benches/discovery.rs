use criterion::{criterion_group, criterion_main, Criterion};
use varmatrix_core::discovery::discover;
use varmatrix_core::naming::VariantNaming;

fn bench_discover(c: &mut Criterion) {
    let temp = tempfile::tempdir().expect("tempdir");
    let naming = VariantNaming::default();
    for id in 0..1000 {
        std::fs::write(temp.path().join(naming.format(id)), b"#define N 1").expect("write");
    }
    std::fs::write(temp.path().join("README.md"), b"parameter sets").expect("write");

    c.bench_function("discover_1000_variants", |b| {
        b.iter(|| discover(temp.path(), &naming).expect("discover"))
    });
}

criterion_group!(benches, bench_discover);
criterion_main!(benches);
