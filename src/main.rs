use std::path::PathBuf;
use std::process;

use clap::Parser;
use det_analysis::config::{EvalConfig, RunOptions, DEFAULT_REPORT_PATH};
use det_analysis::matching::MatchOrder;
use det_analysis::run::run;

#[derive(Parser, Debug)]
#[command(name = "det-analyze")]
#[command(
    version,
    about = "Per-class TP/FP/FN, precision and recall of detection results against COCO ground truth"
)]
struct Cli {
    /// Path to COCO ground-truth annotations JSON
    #[arg(long)]
    gt: PathBuf,

    /// Directory containing one detection JSON per image (<image stem>.json)
    #[arg(long)]
    det_dir: PathBuf,

    /// IoU threshold for a true positive
    #[arg(long, default_value_t = 0.5)]
    iou_thr: f64,

    /// Minimum detection score
    #[arg(long, default_value_t = 0.3)]
    score_thr: f64,

    /// Output text report
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    output: PathBuf,

    /// Also write the report rows as JSON
    #[arg(long)]
    json_output: Option<PathBuf>,

    /// Directory containing the original images (optional)
    #[arg(long)]
    img_dir: Option<PathBuf>,

    /// Directory to save visualized images (optional)
    #[arg(long)]
    vis_dir: Option<PathBuf>,

    /// TTF/OTF font for box labels; boxes are drawn without labels if omitted
    #[arg(long)]
    font: Option<PathBuf>,

    /// Match detections in descending score order instead of file order
    #[arg(long)]
    sort_by_score: bool,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        let match_order = if self.sort_by_score {
            MatchOrder::ScoreDescending
        } else {
            MatchOrder::Supplied
        };

        RunOptions {
            ground_truth: self.gt,
            detection_dir: self.det_dir,
            output: self.output,
            json_output: self.json_output,
            image_dir: self.img_dir,
            vis_dir: self.vis_dir,
            font: self.font,
            eval: EvalConfig::new()
                .with_iou_threshold(self.iou_thr)
                .with_score_threshold(self.score_thr)
                .with_match_order(match_order),
        }
    }
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let options = Cli::parse().into_options();

    let (report, stats) = match run(&options) {
        Ok(outcome) => outcome,
        Err(err) => {
            log::error!("{err}");
            process::exit(1);
        }
    };
    stats.log_summary();

    for row in &report.rows {
        log::info!(
            "{}: TP={} FP={} FN={} precision={:.4} recall={:.4}",
            row.name,
            row.true_positives,
            row.false_positives,
            row.false_negatives,
            row.precision,
            row.recall
        );
    }
}
