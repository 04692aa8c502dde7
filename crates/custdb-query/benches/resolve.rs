//! Query resolution benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use custdb_core::{locate, Field, ParallelConfig, Record};
use custdb_index::{IndexBuilder, ValueIndex};
use custdb_query::{Query, QueryResolver};
use custdb_storage::PartitionStore;
use std::sync::Arc;
use tempfile::TempDir;

fn customers(count: usize) -> Vec<Record> {
    let names = ["Alice", "Bob", "Carol", "Dave", "Erin"];
    (0..count)
        .map(|i| {
            // Spread keys over many prefixes so the store has many partitions
            let prefix: String = [b'a' + (i % 26) as u8, b'a' + (i / 26 % 26) as u8, b'k']
                .iter()
                .map(|&b| b as char)
                .collect();
            Record::new(format!("{}{:06}", prefix, i))
                .with(Field::Name, names[i % names.len()])
                .with(Field::Gender, if i % 2 == 0 { "F" } else { "M" })
                .with(Field::Age, (18 + i % 60).to_string())
        })
        .collect()
}

fn setup(count: usize) -> (Arc<PartitionStore>, Arc<ValueIndex>, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = PartitionStore::new(dir.path().join("customer_buckets"));
    let index = ValueIndex::new(dir.path().join("indexes"));

    let records = customers(count);
    store.write_partitions(&records).unwrap();
    IndexBuilder::new(index.clone())
        .build(&records, &["name", "gender", "age"])
        .unwrap();

    (Arc::new(store), Arc::new(index), dir)
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");

    let keys: Vec<String> = customers(10000).into_iter().map(|r| r.customer_id).collect();

    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("locate_10000", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(locate(black_box(key)).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.sample_size(20);

    let (store, index, _dir) = setup(20000);
    let resolver = QueryResolver::new(Arc::clone(&store), Arc::clone(&index));

    let fast = Query::from_pairs([("customer_id", "bak000001")]).unwrap();
    group.bench_function("fast_path", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&fast)).unwrap()));
    });

    let indexed = Query::from_pairs([("name", "carol"), ("age", "42")]).unwrap();
    group.bench_function("indexed", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&indexed)).unwrap()));
    });

    let full_scan = Query::from_pairs([("occupation", "astronaut")]).unwrap();
    group.bench_function("full_scan", |b| {
        b.iter(|| black_box(resolver.resolve(black_box(&full_scan)).unwrap()));
    });

    let sequential =
        QueryResolver::with_parallel_config(store, index, ParallelConfig::sequential());
    group.bench_function("full_scan_sequential", |b| {
        b.iter(|| black_box(sequential.resolve(black_box(&full_scan)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_locate, bench_resolve);
criterion_main!(benches);
