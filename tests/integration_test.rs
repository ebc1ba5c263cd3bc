//! Integration tests for the vector store

use approx::assert_relative_eq;
use ragvec_db::persistence::codec;
use ragvec_db::{
    Comparison, DistanceMetric, Filter, Metadata, MetadataValue, SnapshotManager, Vector,
    VectorDbError, VectorStore,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn scenario_store() -> VectorStore {
    let mut store = VectorStore::new(DistanceMetric::Cosine);
    store
        .insert_with_metadata("a", Vector::new(vec![1.0, 0.0]), Metadata::new().with("source", "x"))
        .unwrap();
    store
        .insert_with_metadata("b", Vector::new(vec![0.0, 1.0]), Metadata::new().with("source", "y"))
        .unwrap();
    store
        .insert_with_metadata("c", Vector::new(vec![1.0, 1.0]), Metadata::new().with("source", "x"))
        .unwrap();
    store
}

#[test]
fn test_basic_workflow() {
    let mut store = scenario_store();
    assert_eq!(store.len(), 3);

    let query = Vector::new(vec![1.0, 0.0]);
    let results = store.search(&query, 2, Some(DistanceMetric::Cosine), None).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].key, "a");
    assert_relative_eq!(results[0].score, 1.0, epsilon = 1e-12);
    assert_eq!(results[1].key, "c");
    assert_relative_eq!(results[1].score, 0.7071067811865476, epsilon = 1e-9);

    let only_y = Filter::new().eq("source", "y");
    let results = store.search(&query, 2, None, Some(&only_y)).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, "b");
    assert_eq!(results[0].score, 0.0);

    store.delete("b").unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_different_metrics() {
    for metric in DistanceMetric::ALL {
        let mut store = VectorStore::new(metric);
        store.insert("v1", Vector::new(vec![0.9, 0.2, 0.7])).unwrap();
        store.insert("v2", Vector::new(vec![-3.0, 0.1, -2.0])).unwrap();

        let query = Vector::new(vec![0.9, 0.2, 0.7]);
        let results = store.search(&query, 1, None, None).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "v1", "metric {}", metric);
    }
}

#[test]
fn test_citation_fields_pass_through() {
    let mut store = VectorStore::new(DistanceMetric::DotProduct);
    let metadata = Metadata::new()
        .with("source", "rag_survey_paper.pdf")
        .with("author", "Gao et al.")
        .with("page", 12)
        .with("topics", vec!["retrieval", "generation"]);
    store
        .insert_with_metadata("chunk", Vector::new(vec![1.0, 2.0]), metadata.clone())
        .unwrap();

    let results = store.search(&Vector::new(vec![1.0, 1.0]), 1, None, None).unwrap();
    for (field, value) in metadata.iter() {
        assert_eq!(results[0].metadata.get(field), Some(value));
    }
}

#[test]
fn test_filtered_results_satisfy_predicate() {
    let mut store = VectorStore::new(DistanceMetric::Euclidean);
    for page in 0..20 {
        let source = if page % 2 == 0 { "even.pdf" } else { "odd.pdf" };
        store
            .insert_with_metadata(
                format!("page {page}"),
                Vector::new(vec![page as f64, 1.0]),
                Metadata::new().with("source", source).with("page", page),
            )
            .unwrap();
    }

    let filter = Filter::new()
        .one_of("source", ["even.pdf"])
        .compare("page", Comparison::new().gte(4).lt(12).ne(8));
    let results = store
        .search(&Vector::new(vec![10.0, 1.0]), 20, None, Some(&filter))
        .unwrap();

    let pages: Vec<_> = results
        .iter()
        .map(|r| r.metadata.get("page").cloned().unwrap())
        .collect();
    assert_eq!(
        pages,
        vec![
            MetadataValue::Integer(10),
            MetadataValue::Integer(6),
            MetadataValue::Integer(4),
        ]
    );
    assert!(results.iter().all(|r| filter.matches(&r.metadata)));
}

#[test]
fn test_reinsert_keeps_count() {
    let mut store = scenario_store();
    let before = store.get_statistics().total_vectors;
    store
        .insert_with_metadata("a", Vector::new(vec![1.0, 0.0]), Metadata::new().with("source", "z"))
        .unwrap();

    let stats = store.get_statistics();
    assert_eq!(stats.total_vectors, before);
    assert_eq!(
        stats.unique_sources,
        vec![MetadataValue::from("z"), MetadataValue::from("y"), MetadataValue::from("x")]
    );
}

#[test]
fn test_snapshot_round_trip_is_observationally_equal() {
    let dir = TempDir::new().unwrap();
    let mut store = scenario_store();
    store.set_metric(DistanceMetric::Correlation);
    store
        .update_metadata("c", Metadata::new().with("page", 2))
        .unwrap();

    let snapshots = SnapshotManager::new(dir.path()).unwrap();
    snapshots.save(&store).unwrap();
    let loaded = snapshots.load(None).unwrap().unwrap();

    assert_eq!(loaded.get_statistics(), store.get_statistics());
    let queries = [vec![1.0, 0.0], vec![0.3, 0.7], vec![-1.0, 2.0]];
    for q in queries {
        let q = Vector::new(q);
        for metric in [None, Some(DistanceMetric::Jaccard), Some(DistanceMetric::Minkowski)] {
            assert_eq!(
                loaded.search(&q, 3, metric, None).unwrap(),
                store.search(&q, 3, metric, None).unwrap()
            );
        }
    }
}

#[test]
fn test_snapshot_round_trip_keeps_order_and_exact_scores() {
    let dir = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = VectorStore::new(DistanceMetric::DotProduct);

    // Two identical vectors per key pair so every query has ties.
    for key in ["q", "d", "x", "b", "m", "a"] {
        let data: Vec<f64> = (0..64).map(|_| rng.gen_range(-1.0..1.0)).collect();
        store
            .insert_with_metadata(
                format!("{key}-1"),
                Vector::new(data.clone()),
                Metadata::new().with("weight", rng.gen::<f64>()),
            )
            .unwrap();
        store.insert(format!("{key}-0"), Vector::new(data)).unwrap();
    }

    let snapshots = SnapshotManager::new(dir.path()).unwrap();
    snapshots.save(&store).unwrap();
    let loaded = snapshots.load(None).unwrap().unwrap();

    assert_eq!(
        loaded.keys().collect::<Vec<_>>(),
        store.keys().collect::<Vec<_>>()
    );
    for _ in 0..5 {
        let query = Vector::new((0..64).map(|_| rng.gen_range(-1.0..1.0)).collect());
        for metric in DistanceMetric::ALL {
            let before = store.search(&query, 12, Some(metric), None).unwrap();
            let after = loaded.search(&query, 12, Some(metric), None).unwrap();
            assert_eq!(after, before, "metric {}", metric);
            for (a, b) in before.iter().zip(&after) {
                assert_eq!(a.score.to_bits(), b.score.to_bits());
            }
        }
    }
}

#[test]
fn test_load_rejects_unknown_metric() {
    let mut document = scenario_store().to_document();
    document.active_metric = "levenshtein".to_string();
    let err = VectorStore::from_document(document, None).unwrap_err();
    assert!(matches!(err, VectorDbError::UnknownMetric { ref name, .. } if name == "levenshtein"));
    assert!(codec::from_json(br#"{"records":{},"active_metric":"nope"}"#, None).is_err());
}
