//! Criterion benchmarks for Tocsin.
//!
//! Covers the per-message hot paths:
//! - Message analysis and tokenization
//! - Feature pipeline fitting and transformation
//! - Per-category boosting

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tocsin::analysis::tokenize;
use tocsin::ml::{
    BoosterConfig, FeaturePipeline, LabelMatrix, MultiOutputClassifier, StartingVerbExtractor,
    Transformer,
};

/// Generate disaster-style messages for benchmarking.
fn generate_test_messages(count: usize) -> Vec<String> {
    let openers = [
        "Please send",
        "We need",
        "RT urgent",
        "The families have no",
        "Help us with",
        "Our village is without",
    ];
    let needs = [
        "water",
        "food",
        "tents",
        "medicine",
        "blankets",
        "shelter",
        "clean water and food",
        "doctors for the injured",
    ];
    let places = [
        "in Leogane",
        "near the hospital",
        "at the camp",
        "after the floods",
        "since the earthquake",
    ];

    (0..count)
        .map(|i| {
            let mut text = format!(
                "{} {} {}.",
                openers[i % openers.len()],
                needs[(i * 7) % needs.len()],
                places[(i * 3) % places.len()]
            );
            if i % 4 == 0 {
                text.push_str(" More info at http://example.org/report?id=42");
            }
            text
        })
        .collect()
}

/// Benchmark message analysis.
fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");
    let messages = generate_test_messages(1000);

    group.bench_function("tokenize_single_message", |b| {
        b.iter(|| {
            let result = tokenize(black_box(&messages[0]));
            black_box(result)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("tokenize_batch_messages", |b| {
        b.iter(|| {
            for message in messages.iter().take(100) {
                let _ = black_box(tokenize(black_box(message)));
            }
        })
    });

    let extractor = StartingVerbExtractor::new();
    group.bench_function("starting_verb_batch", |b| {
        b.iter(|| black_box(extractor.flags(black_box(&messages[..100]))))
    });

    group.finish();
}

/// Benchmark the feature pipeline.
fn bench_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");
    group.sample_size(20);

    let messages = generate_test_messages(500);

    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("pipeline_fit_transform", |b| {
        b.iter_with_setup(
            || FeaturePipeline::new(true),
            |mut pipeline| black_box(pipeline.fit_transform(&messages)),
        )
    });

    let mut pipeline = FeaturePipeline::new(true);
    if pipeline.fit(&messages).is_ok() {
        group.bench_function("pipeline_transform", |b| {
            b.iter(|| black_box(pipeline.transform(black_box(&messages))))
        });
    }

    group.finish();
}

/// Benchmark per-category boosting.
fn bench_boosting(c: &mut Criterion) {
    let mut group = c.benchmark_group("boosting");
    group.sample_size(10);

    let messages = generate_test_messages(300);
    let mut pipeline = FeaturePipeline::new(false);
    let Ok(features) = pipeline.fit_transform(&messages) else {
        return;
    };

    let categories = vec!["water".to_string(), "food".to_string(), "shelter".to_string()];
    let rows = messages
        .iter()
        .map(|m| {
            categories
                .iter()
                .map(|c| u8::from(m.contains(c.as_str())))
                .collect()
        })
        .collect();
    let Ok(labels) = LabelMatrix::new(categories, rows) else {
        return;
    };

    group.bench_function("multi_output_fit_20_rounds", |b| {
        b.iter_with_setup(
            || MultiOutputClassifier::new(20, BoosterConfig::default()),
            |mut classifier| black_box(classifier.fit(&features, &labels)),
        )
    });

    group.finish();
}

criterion_group!(benches, bench_text_analysis, bench_features, bench_boosting);
criterion_main!(benches);
