//! Benchmarks for segmentation, normalization and table detection.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdfsift::source::{TableDetector, TextSpan};
use pdfsift::{segment, NormalizationOptions, Normalizer};

/// Page-sized mixed Japanese/Latin text with URLs and bullets.
fn sample_page(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!(
            "・第{}項 ＰＤＦの仕様はhttps://example.com/spec/{}を参照ｶﾞｲﾄﾞ。連絡先 info{}@example.jp まで。\n",
            i + 1,
            i,
            i
        ));
    }
    text
}

/// A grid of spans laid out like a simple table.
fn sample_spans(rows: usize, columns: usize) -> Vec<TextSpan> {
    let mut spans = Vec::with_capacity(rows * columns);
    for r in 0..rows {
        for c in 0..columns {
            spans.push(TextSpan::new(
                format!("r{}c{}", r, c),
                72.0 + c as f32 * 90.0,
                720.0 - r as f32 * 18.0,
                12.0,
            ));
        }
    }
    spans
}

fn bench_segmentation(c: &mut Criterion) {
    let page = sample_page(40);
    c.bench_function("segment_page", |b| {
        b.iter(|| segment(black_box(&page)));
    });
}

fn bench_normalization(c: &mut Criterion) {
    let segments = segment(&sample_page(40));
    let mut group = c.benchmark_group("normalize");

    let presets = [
        ("none", NormalizationOptions::new()),
        ("legacy", NormalizationOptions::legacy_preset()),
        (
            "width_and_digits",
            NormalizationOptions::new()
                .fullwidth_alnum()
                .halfwidth_kana()
                .digits_to_zero(),
        ),
    ];
    for (name, options) in presets {
        let normalizer = Normalizer::new(options.build().unwrap());
        group.bench_function(name, |b| {
            b.iter(|| {
                for s in &segments {
                    black_box(normalizer.clean(black_box(s)));
                }
            });
        });
    }

    group.finish();
}

fn bench_normalizer_creation(c: &mut Criterion) {
    let config = NormalizationOptions::legacy_preset().build().unwrap();
    c.bench_function("normalizer_creation", |b| {
        b.iter(|| Normalizer::new(black_box(config)));
    });
}

fn bench_table_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_detection");
    let detector = TableDetector::new();

    for rows in [5, 20, 40] {
        let spans = sample_spans(rows, 4);
        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| detector.detect(black_box(&spans)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_segmentation,
    bench_normalization,
    bench_normalizer_creation,
    bench_table_detection,
);
criterion_main!(benches);
