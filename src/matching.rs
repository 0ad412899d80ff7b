//! Greedy detection-to-ground-truth matching within one (image, class) pair.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::ops::AddAssign;

use crate::metrics::iou::calculate_iou;
use crate::types::{BoxFormat, Detection, GroundTruth};

/// TP/FP/FN counters for one class.
///
/// Used both as the per-(image, class) delta produced by [`match_class`] and as
/// the running total kept by the evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassTally {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl ClassTally {
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// TP / (TP + FP), or 0.0 when nothing was detected.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN), or 0.0 when there was no ground truth.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

impl fmt::Display for ClassTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GT: {}, DT: {}, TP: {}, FP: {}, FN: {}",
            self.true_positives + self.false_negatives,
            self.true_positives + self.false_positives,
            self.true_positives,
            self.false_positives,
            self.false_negatives
        )
    }
}

impl AddAssign for ClassTally {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positives += rhs.true_positives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
    }
}

/// Order in which detections of one class are offered to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    /// Keep the order the detections were supplied in.
    #[default]
    Supplied,
    /// Stable sort by descending score before matching.
    ScoreDescending,
}

/// Reorder detections in place according to `order`.
pub fn order_detections<D: Borrow<Detection>>(detections: &mut [D], order: MatchOrder) {
    if order == MatchOrder::ScoreDescending {
        detections.sort_by(|a, b| {
            b.borrow()
                .score
                .partial_cmp(&a.borrow().score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
}

/// Match detections to ground truths of a single image and class.
///
/// Detections are visited in slice order. Each one takes the unclaimed ground
/// truth with the strictly greatest IoU (the first one wins a tie) and counts
/// as a true positive when that IoU is `>= iou_threshold`. Otherwise it is a
/// false positive. A claimed ground truth cannot be matched again. Ground
/// truths left unclaimed are false negatives.
///
/// Detection boxes are read as `xyxy`, ground-truth boxes as `xywh`.
///
/// # Example
///
/// ```
/// use det_analysis::matching::match_class;
/// use det_analysis::types::{Detection, GroundTruth};
///
/// let detections = vec![Detection::new(1, [10.0, 10.0, 60.0, 60.0], 0.9)];
/// let ground_truths = vec![GroundTruth::new(1, [10.0, 10.0, 50.0, 50.0])];
///
/// let tally = match_class(&detections, &ground_truths, 0.5);
/// assert_eq!(tally.true_positives, 1);
/// assert_eq!(tally.false_negatives, 0);
/// ```
pub fn match_class<D, G>(detections: &[D], ground_truths: &[G], iou_threshold: f64) -> ClassTally
where
    D: Borrow<Detection>,
    G: Borrow<GroundTruth>,
{
    let mut matched_gt: HashSet<usize> = HashSet::with_capacity(ground_truths.len());
    let mut tally = ClassTally::default();

    for (det_idx, det) in detections.iter().enumerate() {
        let det = det.borrow();
        let mut best_iou = 0.0;
        let mut best_gt_idx: Option<usize> = None;

        for (gt_idx, gt) in ground_truths.iter().enumerate() {
            if matched_gt.contains(&gt_idx) {
                continue;
            }

            let iou = calculate_iou(&det.bbox, BoxFormat::Xyxy, &gt.borrow().bbox, BoxFormat::Xywh);
            if iou > best_iou {
                best_iou = iou;
                best_gt_idx = Some(gt_idx);
            }
        }

        match best_gt_idx {
            Some(gt_idx) if best_iou >= iou_threshold => {
                matched_gt.insert(gt_idx);
                tally.true_positives += 1;
                log::debug!("  DT[{det_idx}] (score={:.4}) -> Best IoU={best_iou:.4} [TP]", det.score);
            }
            _ => {
                tally.false_positives += 1;
                log::debug!("  DT[{det_idx}] (score={:.4}) -> Best IoU={best_iou:.4} [FP]", det.score);
            }
        }
    }

    tally.false_negatives = ground_truths.len() - tally.true_positives;
    if tally.false_negatives > 0 {
        log::debug!("  FN: {} unmatched GT objects", tally.false_negatives);
    }

    tally
}
