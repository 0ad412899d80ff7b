use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use det_analysis::evaluator::evaluate_image;
use det_analysis::matching::match_class;
use det_analysis::metrics::calculate_iou;
use det_analysis::types::{BoxFormat, Detection, GroundTruth};
use det_analysis::EvalConfig;

fn bench_iou_calculation(c: &mut Criterion) {
    let detection = [10.0, 10.0, 60.0, 60.0];
    let ground_truth = [30.0, 30.0, 50.0, 50.0];

    c.bench_function("iou_single", |b| {
        b.iter(|| {
            calculate_iou(
                black_box(&detection),
                BoxFormat::Xyxy,
                black_box(&ground_truth),
                BoxFormat::Xywh,
            )
        });
    });
}

fn scene(size: usize, category_count: u64) -> (Vec<GroundTruth>, Vec<Detection>) {
    let ground_truths = (0..size)
        .map(|i| {
            let offset = (i as f64) * 2.0;
            GroundTruth::new(i as u64 % category_count + 1, [offset, offset, 50.0, 50.0])
        })
        .collect();
    let detections = (0..size)
        .map(|i| {
            let offset = (i as f64) * 2.0 + 1.0;
            Detection::new(
                i as u64 % category_count + 1,
                [offset, offset, offset + 50.0, offset + 50.0],
                0.9 - (i as f64) * 0.0001,
            )
        })
        .collect();
    (ground_truths, detections)
}

fn bench_match_class(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_class");

    for size in [10, 50, 100, 500].iter() {
        let (ground_truths, detections) = scene(*size, 1);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| match_class(black_box(&detections), black_box(&ground_truths), 0.5));
        });
    }
    group.finish();
}

fn bench_evaluate_image(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_image");
    let config = EvalConfig::default();
    let category_ids: Vec<u64> = (1..=80).collect();

    for size in [100, 500].iter() {
        let (ground_truths, detections) = scene(*size, 80);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                evaluate_image(
                    black_box(&ground_truths),
                    black_box(&detections),
                    &category_ids,
                    &config,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_iou_calculation, bench_match_class, bench_evaluate_image);
criterion_main!(benches);
