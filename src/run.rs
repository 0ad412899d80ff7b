//! End-to-end driver: load, filter, visualize, match, report.

use crate::config::RunOptions;
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::loader::{detection_path, load_detections, load_ground_truth};
use crate::report::Report;
use crate::stats::RunStats;
use crate::threshold::filter_by_score;
use crate::visualize::{load_font, save_visualization};

/// Run a full analysis and write the report files named in `options`.
///
/// Images are visited in ground-truth order. A missing detection file counts
/// as an image without detections. A failed visualization is logged and
/// counted but does not stop the run.
///
/// # Errors
///
/// Fails on unreadable ground truth, on a detection file that exists but
/// cannot be parsed, on detections of unknown classes, and when the report
/// cannot be written.
pub fn run(options: &RunOptions) -> Result<(Report, RunStats)> {
    options.eval.validate()?;

    log::info!("Loading ground truth from {}", options.ground_truth.display());
    let ground_truth = load_ground_truth(&options.ground_truth)?;
    log::info!(
        "Loaded {} images, {} annotations, {} categories",
        ground_truth.images.len(),
        ground_truth.annotation_count(),
        ground_truth.categories.len()
    );

    let names = ground_truth.category_names();
    let font = options.font.as_ref().map(load_font).transpose()?;
    let mut evaluator = Evaluator::new(&ground_truth.categories, options.eval)?;
    let mut stats = RunStats::new();

    for image in &ground_truth.images {
        let gts = ground_truth.ground_truths(image.id);
        let det_path = detection_path(&options.detection_dir, &image.file_name);

        let loaded = match load_detections(&det_path)? {
            Some(dets) => dets,
            None => {
                stats.add_missing_detection_file();
                Vec::new()
            }
        };
        let dets = filter_by_score(&loaded, options.eval.score_threshold)?;
        stats.add_detections(loaded.len(), dets.len());

        log::debug!(
            "Image: {} (ID: {}) GT Objects: {}, Detection Objects: {}",
            image.file_name,
            image.id,
            gts.len(),
            dets.len()
        );

        if let Some((img_dir, vis_dir)) = options.visualization_dirs() {
            match save_visualization(img_dir, vis_dir, &image.file_name, gts, &dets, &names, font.as_ref()) {
                Ok(Some(path)) => {
                    log::info!("Saved visualization: {}", path.display());
                    stats.add_visualization(true);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("Failed to visualize {}: {}", image.file_name, err);
                    stats.add_visualization(false);
                }
            }
        }

        evaluator.process_image(gts, &dets)?;
        stats.add_image();
    }

    let report = evaluator.finish();
    report.save_text(&options.output)?;
    log::info!("Report saved to {}", options.output.display());

    if let Some(json_path) = &options.json_output {
        report.save_json(json_path)?;
        log::info!("JSON report saved to {}", json_path.display());
    }

    Ok((report, stats))
}
