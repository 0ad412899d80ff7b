//! Per-class accumulation of TP/FP/FN across a run.
//!
//! An [`Evaluator`] is created from the ground-truth taxonomy, fed one image at
//! a time through [`Evaluator::process_image`], and consumed by
//! [`Evaluator::finish`] to produce the final [`Report`]. Once finished it can
//! no longer accumulate.

use std::collections::{BTreeMap, HashSet};

use crate::config::EvalConfig;
use crate::error::{AnalysisError, Result};
use crate::matching::{match_class, order_detections, ClassTally};
use crate::report::{Report, ReportRow};
use crate::types::{Category, CategoryId, Detection, GroundTruth};

/// Per-class deltas produced by one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageTallies {
    pub tallies: BTreeMap<CategoryId, ClassTally>,
}

impl ImageTallies {
    pub fn get(&self, category_id: CategoryId) -> ClassTally {
        self.tallies.get(&category_id).copied().unwrap_or_default()
    }
}

/// Match one image against every class of the taxonomy.
///
/// This is a pure function of its inputs, so images can be evaluated
/// independently and folded together with [`Evaluator::merge`].
///
/// # Errors
///
/// Returns [`AnalysisError::UnknownCategory`] if a ground truth or detection
/// carries a class id that is not in `category_ids`.
pub fn evaluate_image(
    ground_truths: &[GroundTruth],
    detections: &[Detection],
    category_ids: &[CategoryId],
    config: &EvalConfig,
) -> Result<ImageTallies> {
    let known: HashSet<CategoryId> = category_ids.iter().copied().collect();
    if let Some(gt) = ground_truths.iter().find(|gt| !known.contains(&gt.category_id)) {
        return Err(AnalysisError::UnknownCategory {
            id: gt.category_id,
            context: "ground truth references a category missing from the taxonomy".to_string(),
        });
    }
    if let Some(det) = detections.iter().find(|det| !known.contains(&det.category_id)) {
        return Err(AnalysisError::UnknownCategory {
            id: det.category_id,
            context: "detection references a category missing from the taxonomy".to_string(),
        });
    }

    let mut result = ImageTallies::default();
    for &category_id in category_ids {
        let class_gts: Vec<&GroundTruth> = ground_truths
            .iter()
            .filter(|gt| gt.category_id == category_id)
            .collect();
        let mut class_dets: Vec<&Detection> = detections
            .iter()
            .filter(|det| det.category_id == category_id)
            .collect();

        order_detections(&mut class_dets, config.match_order);
        let tally = match_class(&class_dets, &class_gts, config.iou_threshold);
        result.tallies.insert(category_id, tally);
    }

    Ok(result)
}

/// Owns the running per-class tallies of one evaluation run.
#[derive(Debug, Clone)]
pub struct Evaluator {
    config: EvalConfig,
    /// Taxonomy in declaration order, with display names.
    categories: Vec<(CategoryId, String)>,
    category_ids: Vec<CategoryId>,
    tallies: BTreeMap<CategoryId, ClassTally>,
    images_processed: usize,
}

impl Evaluator {
    /// Create an evaluator for the given taxonomy.
    ///
    /// Every category starts with a zero tally, so classes without any
    /// activity still appear in the report.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is out of range or `categories` is empty.
    pub fn new(categories: &[Category], config: EvalConfig) -> Result<Self> {
        config.validate()?;

        if categories.is_empty() {
            return Err(AnalysisError::EmptyDataset(
                "At least one category is required".to_string(),
            ));
        }

        let mut ordered: Vec<(CategoryId, String)> = Vec::with_capacity(categories.len());
        for category in categories {
            if ordered.iter().any(|(id, _)| *id == category.id) {
                log::warn!("Duplicate category id {} ({}), keeping the first entry", category.id, category.name);
                continue;
            }
            ordered.push((category.id, category.name.clone()));
        }

        let category_ids: Vec<CategoryId> = ordered.iter().map(|(id, _)| *id).collect();
        let tallies = category_ids
            .iter()
            .map(|&id| (id, ClassTally::default()))
            .collect();

        Ok(Self {
            config,
            categories: ordered,
            category_ids,
            tallies,
            images_processed: 0,
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn category_ids(&self) -> &[CategoryId] {
        &self.category_ids
    }

    pub fn images_processed(&self) -> usize {
        self.images_processed
    }

    /// Display name of a class, as declared in the taxonomy.
    pub fn category_name(&self, category_id: CategoryId) -> Option<&str> {
        self.categories
            .iter()
            .find(|(id, _)| *id == category_id)
            .map(|(_, name)| name.as_str())
    }

    /// Current running tally of one class.
    pub fn tally(&self, category_id: CategoryId) -> Option<ClassTally> {
        self.tallies.get(&category_id).copied()
    }

    /// Evaluate one image and add its deltas into the running tallies.
    ///
    /// `detections` must already be score-filtered. On error nothing is added.
    pub fn process_image(
        &mut self,
        ground_truths: &[GroundTruth],
        detections: &[Detection],
    ) -> Result<ImageTallies> {
        let delta = evaluate_image(ground_truths, detections, &self.category_ids, &self.config)?;
        for (id, name) in &self.categories {
            let tally = delta.get(*id);
            if !tally.is_empty() {
                log::debug!("[{name}] {tally}");
            }
        }
        self.merge(&delta)?;
        Ok(delta)
    }

    /// Add deltas computed elsewhere by [`evaluate_image`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::UnknownCategory`] if `delta` holds a class
    /// outside this evaluator's taxonomy. Nothing is added in that case.
    pub fn merge(&mut self, delta: &ImageTallies) -> Result<()> {
        if let Some(id) = delta.tallies.keys().find(|id| !self.tallies.contains_key(*id)) {
            return Err(AnalysisError::UnknownCategory {
                id: *id,
                context: "merged tallies reference a category missing from the taxonomy".to_string(),
            });
        }
        for (category_id, tally) in &delta.tallies {
            if let Some(total) = self.tallies.get_mut(category_id) {
                *total += *tally;
            }
        }
        self.images_processed += 1;
        Ok(())
    }

    /// Stop accumulating and build the report, one row per category.
    pub fn finish(self) -> Report {
        let rows = self
            .categories
            .iter()
            .map(|(id, name)| {
                let tally = self.tallies.get(id).copied().unwrap_or_default();
                ReportRow::from_tally(*id, name.as_str(), tally)
            })
            .collect();

        Report::new(self.config.iou_threshold, self.config.score_threshold, rows)
    }
}
