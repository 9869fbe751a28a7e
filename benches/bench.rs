// Criterion benchmarks for the scoring path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use credit_scoring_api::core::{align_batch, parse_batch};
use credit_scoring_api::{ModelArtifact, RecordBatch, ScoringModel};
use serde_json::{json, Value};

const N_FEATURES: usize = 120;

fn feature_names() -> Vec<String> {
    (0..N_FEATURES).map(|i| format!("feature_{}", i)).collect()
}

fn logistic_model() -> ScoringModel {
    let coefficients: Vec<f64> = (0..N_FEATURES).map(|i| (i as f64 - 60.0) * 1e-3).collect();
    let artifact: ModelArtifact = serde_json::from_value(json!({
        "feature_names": feature_names(),
        "estimator": {"kind": "logistic", "coefficients": coefficients, "intercept": -0.3}
    }))
    .unwrap();
    ScoringModel::from_artifact(artifact).unwrap()
}

fn tree_model() -> ScoringModel {
    // 200 depth-one stumps over rotating features
    let trees: Vec<Value> = (0..200)
        .map(|t| {
            json!({"nodes": [
                {"feature": t % N_FEATURES, "threshold": 0.5, "left": 1, "right": 2},
                {"value": -0.01},
                {"value": 0.02}
            ]})
        })
        .collect();
    let artifact: ModelArtifact = serde_json::from_value(json!({
        "feature_names": feature_names(),
        "estimator": {"kind": "tree_ensemble", "base_score": 0.0, "trees": trees}
    }))
    .unwrap();
    ScoringModel::from_artifact(artifact).unwrap()
}

/// Records shaped like a CSV export: most features present, some as strings,
/// some missing, plus columns the model does not use
fn create_batch(n_records: usize) -> RecordBatch {
    let records: Vec<Value> = (0..n_records)
        .map(|r| {
            let mut record = serde_json::Map::new();
            for f in 0..N_FEATURES {
                if (r + f) % 10 == 0 {
                    continue;
                }
                let value = if f % 7 == 0 {
                    Value::String(format!("{}", (r * f) % 13))
                } else {
                    json!(((r * 31 + f * 17) % 100) as f64 / 100.0)
                };
                record.insert(format!("feature_{}", f), value);
            }
            record.insert("SK_ID_CURR".to_string(), json!(100000 + r));
            Value::Object(record)
        })
        .collect();
    parse_batch(Value::Array(records)).unwrap()
}

fn bench_alignment(c: &mut Criterion) {
    let names = feature_names();
    let schema = credit_scoring_api::core::FeatureSchema::new(names).unwrap();
    let batch = create_batch(1000);

    c.bench_function("align_batch_1000", |b| {
        b.iter(|| align_batch(black_box(&schema), black_box(&batch)));
    });
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    let logistic = logistic_model();
    let trees = tree_model();

    for size in [10, 100, 1000] {
        let batch = create_batch(size);

        group.bench_with_input(BenchmarkId::new("logistic", size), &batch, |b, batch| {
            b.iter(|| logistic.predict(black_box(batch)));
        });
        group.bench_with_input(BenchmarkId::new("tree_ensemble", size), &batch, |b, batch| {
            b.iter(|| trees.predict(black_box(batch)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_alignment, bench_predict);
criterion_main!(benches);
