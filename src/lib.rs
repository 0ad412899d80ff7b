//! # det-analysis
//!
//! Per-class evaluation of object detection results against COCO ground truth.
//!
//! For every image and every class, detections are greedily matched to
//! ground-truth boxes by IoU. The resulting true positives, false positives
//! and false negatives are summed per class over the whole dataset and
//! reported together with precision and recall.
//!
//! ## Features
//!
//! - Calculate IoU between boxes given as `xyxy` or `xywh`
//! - Greedy, order-preserving matching within one (image, class) pair
//! - Running per-class TP/FP/FN tallies with a final precision/recall report
//! - Load COCO ground truth and per-image detection files in two shapes
//! - Optional visualization of ground truth and detections on source images
//!
//! ## Quick Start
//!
//! ```rust
//! use det_analysis::{Category, Detection, EvalConfig, Evaluator, GroundTruth};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let categories = vec![Category { id: 1, name: "person".to_string(), supercategory: None }];
//! let mut evaluator = Evaluator::new(&categories, EvalConfig::default())?;
//!
//! // Ground truth is [x, y, w, h], detections are [x1, y1, x2, y2]
//! let gts = vec![GroundTruth::new(1, [10.0, 10.0, 50.0, 50.0])];
//! let dets = vec![Detection::new(1, [12.0, 10.0, 60.0, 60.0], 0.9)];
//! evaluator.process_image(&gts, &dets)?;
//!
//! let report = evaluator.finish();
//! assert_eq!(report.rows[0].true_positives, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod matching;
pub mod metrics;
pub mod report;
pub mod run;
pub mod stats;
pub mod threshold;
pub mod types;
pub mod visualize;

// Re-export commonly used types and functions
pub use config::{EvalConfig, RunOptions};
pub use error::{AnalysisError, Result};
pub use evaluator::{evaluate_image, Evaluator, ImageTallies};
pub use loader::{load_detections, load_ground_truth};
pub use matching::{match_class, ClassTally, MatchOrder};
pub use metrics::calculate_iou;
pub use report::{Report, ReportRow};
pub use types::{BBox, BoxFormat, Category, CategoryId, Detection, GroundTruth, GroundTruthSet};
