//! Evaluation and run configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::matching::MatchOrder;
use crate::threshold::validate_threshold;

pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_REPORT_PATH: &str = "analysis_report.txt";

/// Scalars that drive matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Minimum IoU for a detection to count as a true positive.
    pub iou_threshold: f64,
    /// Minimum score for a detection to be evaluated at all.
    pub score_threshold: f64,
    pub match_order: MatchOrder,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            match_order: MatchOrder::Supplied,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: f64) -> Self {
        self.score_threshold = score_threshold;
        self
    }

    pub fn with_match_order(mut self, match_order: MatchOrder) -> Self {
        self.match_order = match_order;
        self
    }

    /// Both thresholds must lie in [0.0, 1.0].
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.iou_threshold)?;
        validate_threshold(self.score_threshold)?;
        Ok(())
    }
}

/// Everything the end-to-end driver needs: inputs, outputs and [`EvalConfig`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ground_truth: PathBuf,
    pub detection_dir: PathBuf,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub image_dir: Option<PathBuf>,
    pub vis_dir: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub eval: EvalConfig,
}

impl RunOptions {
    pub fn new(ground_truth: impl Into<PathBuf>, detection_dir: impl Into<PathBuf>) -> Self {
        Self {
            ground_truth: ground_truth.into(),
            detection_dir: detection_dir.into(),
            output: PathBuf::from(DEFAULT_REPORT_PATH),
            json_output: None,
            image_dir: None,
            vis_dir: None,
            font: None,
            eval: EvalConfig::default(),
        }
    }

    /// Visualization runs only when both the source and target directories are set.
    pub fn visualization_dirs(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.image_dir.as_ref().zip(self.vis_dir.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.iou_threshold, 0.5);
        assert_eq!(config.score_threshold, 0.3);
        assert_eq!(config.match_order, MatchOrder::Supplied);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(EvalConfig::new().with_iou_threshold(1.2).validate().is_err());
        assert!(EvalConfig::new().with_score_threshold(-0.5).validate().is_err());
    }

    #[test]
    fn test_visualization_requires_both_dirs() {
        let mut options = RunOptions::new("gt.json", "dets");
        assert!(options.visualization_dirs().is_none());
        options.image_dir = Some(PathBuf::from("images"));
        assert!(options.visualization_dirs().is_none());
        options.vis_dir = Some(PathBuf::from("vis"));
        assert!(options.visualization_dirs().is_some());
    }
}
