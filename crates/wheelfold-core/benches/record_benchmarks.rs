use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tempfile::tempdir;
use wheelfold_core::missing_lines;

fn manifest(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}/mod_{i}.py,sha256=e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855,{i}\n"))
        .collect()
}

fn missing_lines_benchmark(c: &mut Criterion) {
    c.bench_function("record::missing_lines (2000 x 2000)", |b| {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b_path = dir.path().join("b");
        std::fs::write(&a, manifest("pkg", 2000)).unwrap();
        std::fs::write(&b_path, manifest("pkg", 1000) + &manifest("other", 1000)).unwrap();

        b.iter(|| {
            missing_lines(black_box(&a), black_box(&b_path)).unwrap();
        })
    });
}

criterion_group!(benches, missing_lines_benchmark);
criterion_main!(benches);
