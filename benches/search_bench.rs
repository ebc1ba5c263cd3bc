//! Benchmarks for vector search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ragvec_db::{DistanceMetric, Filter, Metadata, Vector, VectorStore};

fn create_random_vectors(n: usize, dim: usize) -> Vec<Vector> {
    (0..n)
        .map(|_| {
            let data: Vec<f64> = (0..dim).map(|_| rand::random::<f64>()).collect();
            Vector::new(data)
        })
        .collect()
}

fn build_store(size: usize) -> VectorStore {
    let mut store = VectorStore::new(DistanceMetric::Cosine);
    for (i, v) in create_random_vectors(size, 384).into_iter().enumerate() {
        let source = format!("doc{}.pdf", i % 10);
        store
            .insert_with_metadata(format!("chunk {}", i), v, Metadata::new().with("source", source))
            .unwrap();
    }
    store
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let query = Vector::new(vec![0.5; 384]);

    for size in [100, 1000, 10000].iter() {
        let store = build_store(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| store.search(black_box(&query), black_box(10), None, None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metric");
    let store = build_store(1000);
    let query = Vector::new(vec![0.5; 384]);

    for metric in DistanceMetric::ALL {
        group.bench_function(metric.name(), |b| {
            b.iter(|| store.search(black_box(&query), 10, Some(metric), None).unwrap());
        });
    }

    group.finish();
}

fn benchmark_filtered_search(c: &mut Criterion) {
    let store = build_store(10000);
    let query = Vector::new(vec![0.5; 384]);
    let filter = Filter::new().one_of("source", ["doc1.pdf", "doc2.pdf"]);

    c.bench_function("filtered_search_10000", |b| {
        b.iter(|| {
            store
                .search(black_box(&query), 10, None, Some(&filter))
                .unwrap()
        });
    });
}

criterion_group!(benches, benchmark_search, benchmark_metrics, benchmark_filtered_search);
criterion_main!(benches);
