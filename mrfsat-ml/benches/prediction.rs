//! Benchmark line-to-label prediction

use criterion::{Criterion, criterion_group, criterion_main};
use mrfsat_core::{FeatureSchema, Label, RecordParser, RecordSchema};
use mrfsat_ml::{Classifier, ForestConfig, PredictionService, RandomForest};
use std::hint::black_box;

fn fitted_forest(n_trees: usize) -> RandomForest {
    let x: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            let t = i as f64 / 200.0;
            vec![t, 1.0 - t, t * 0.5, (i % 7) as f64, (i % 3) as f64]
        })
        .collect();
    let y: Vec<Label> = x.iter().map(|r| Label::from(r[0] > 0.5)).collect();

    let mut forest = RandomForest::new(5, ForestConfig::default().with_trees(n_trees).with_seed(1));
    forest.fit(&x, &y).unwrap();
    forest
}

fn benchmark_forest_predict(c: &mut Criterion) {
    let forest = fitted_forest(100);
    let input = vec![0.4, 0.6, 0.2, 3.0, 1.0];

    c.bench_function("forest_predict", |b| {
        b.iter(|| forest.predict(black_box(&input)));
    });
}

fn benchmark_classify_line(c: &mut Criterion) {
    let service = PredictionService::new(
        fitted_forest(100),
        RecordParser::new(RecordSchema::canonical()),
        FeatureSchema::canonical(),
    )
    .unwrap();
    let line = "inst1,3,10,50,20,0.5,0.1,2.0,0.3,";

    c.bench_function("classify_line", |b| {
        b.iter(|| service.classify_line(black_box(line)));
    });
}

fn benchmark_forest_fit(c: &mut Criterion) {
    c.bench_function("forest_fit_10_trees", |b| {
        b.iter(|| fitted_forest(black_box(10)));
    });
}

criterion_group!(
    benches,
    benchmark_forest_predict,
    benchmark_classify_line,
    benchmark_forest_fit
);
criterion_main!(benches);
