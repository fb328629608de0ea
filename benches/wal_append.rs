use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use norikv_lite::wal::{Op, Wal};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const VALUE_SIZES: &[usize] = &[16, 256, 4096];

fn bench_data_dir() -> PathBuf {
    PathBuf::from("target/bench-data-wal")
}

fn cleanup() {
    let _ = fs::remove_dir_all(bench_data_dir());
}

fn generate_value(size: usize) -> String {
    "x".repeat(size)
}

fn append_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("wal_append");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(10));

    cleanup();
    fs::create_dir_all(bench_data_dir()).expect("failed to create bench data dir");

    for value_size in VALUE_SIZES {
        let value = generate_value(*value_size);
        let path = bench_data_dir().join(format!("wal_{value_size}.log"));
        let _ = fs::remove_file(&path);
        let wal = Wal::open(&path).expect("failed to open wal");

        let mut i: u64 = 0;
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{value_size}_bytes")),
            value_size,
            |b, _| {
                b.iter(|| {
                    let key = format!("key_{i}");
                    wal.append(Op::Set, &key, black_box(&value))
                        .expect("append failed");
                    i += 1;
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, append_latency);
criterion_main!(benches);
