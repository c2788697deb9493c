// In rowset-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

use rowset::bridge::{decode, validate_and_encode_to_vec};
use rowset::codec::Compression;
use rowset::{ColumnDefinition, ColumnType, Row, RowSet, RowSetConfig};

// --- Mock Data Generation ---

fn bench_schema() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("1", "label", ColumnType::String).with_max_size(64),
        ColumnDefinition::new("2", "count", ColumnType::Integer),
        ColumnDefinition::new("3", "ratio", ColumnType::Double),
        ColumnDefinition::new("4", "flag", ColumnType::Boolean),
        ColumnDefinition::new("5", "ref", ColumnType::EntityId),
    ]
}

/// Generates a batch of already-identified rows with random values and ~10% nulls.
fn generate_batch(rows: usize) -> RowSet {
    let mut rng = rand::rng();
    let data = (0..rows)
        .map(|i| {
            let label = format!("label, number {}", rng.random_range(0..1_000_000));
            let count = rng.random_range(-1_000i64..1_000_000).to_string();
            let ratio = rng.random_range(0.0f64..1.0).to_string();
            let flag = rng.random_bool(0.5).to_string();
            let reference = format!("syn{}", rng.random_range(1..10_000_000));
            let values = [label, count, ratio, flag, reference]
                .map(|value| (rng.random_range(0..10) != 0).then_some(value));
            Row::new(values).with_id(i as i64 + 1, 1)
        })
        .collect();
    RowSet::for_schema(&bench_schema(), data)
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 10_000;

fn bench_codec(c: &mut Criterion) {
    let schema = bench_schema();
    let batch = generate_batch(BENCH_ROWS);

    let mut group = c.benchmark_group("Row Codec");
    group.throughput(criterion::Throughput::Elements(BENCH_ROWS as u64));

    for compression in [Compression::None, Compression::Gzip, Compression::Zstd] {
        let config = RowSetConfig {
            compression,
            enforce_batch_budget: false,
            ..RowSetConfig::default()
        };
        let encoded = validate_and_encode_to_vec(&schema, &batch, &config).unwrap();

        group.bench_function(format!("Validate+Encode ({:?})", compression), |b| {
            b.iter(|| black_box(validate_and_encode_to_vec(&schema, black_box(&batch), &config)))
        });
        group.bench_function(format!("Decode ({:?})", compression), |b| {
            b.iter(|| black_box(decode(black_box(&encoded), None)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
