//! Bookkeeping for a full analysis run.
//!
//! These counters describe the input side of a run (files found, detections
//! dropped by the score threshold, visualizations written). They are separate
//! from the per-class tallies and never influence matching.

use serde::{Deserialize, Serialize};

/// Counters collected while driving an evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of ground-truth images visited
    pub images_processed: usize,

    /// Images whose detection file was not found
    pub missing_detection_files: usize,

    /// Detections read from disk, before score filtering
    pub detections_loaded: usize,

    /// Detections dropped because their score was below the threshold
    pub below_score_threshold: usize,

    /// Visualizations written successfully
    pub visualizations_saved: usize,

    /// Visualizations that could not be produced
    pub visualizations_failed: usize,
}

impl RunStats {
    /// Create a new `RunStats` with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self) {
        self.images_processed += 1;
    }

    pub fn add_missing_detection_file(&mut self) {
        self.missing_detection_files += 1;
    }

    /// Record how many detections were loaded and how many survived filtering.
    pub fn add_detections(&mut self, loaded: usize, kept: usize) {
        self.detections_loaded += loaded;
        self.below_score_threshold += loaded.saturating_sub(kept);
    }

    pub fn add_visualization(&mut self, saved: bool) {
        if saved {
            self.visualizations_saved += 1;
        } else {
            self.visualizations_failed += 1;
        }
    }

    /// Detections that reached the matcher.
    pub fn detections_evaluated(&self) -> usize {
        self.detections_loaded.saturating_sub(self.below_score_threshold)
    }

    /// Log a summary of the run at info level
    pub fn log_summary(&self) {
        log::info!("Images processed: {}", self.images_processed);
        log::info!("Missing detection files: {}", self.missing_detection_files);
        log::info!(
            "Detections loaded: {} (evaluated: {}, below score threshold: {})",
            self.detections_loaded,
            self.detections_evaluated(),
            self.below_score_threshold
        );
        if self.visualizations_saved + self.visualizations_failed > 0 {
            log::info!(
                "Visualizations saved: {}, failed: {}",
                self.visualizations_saved,
                self.visualizations_failed
            );
        }
    }

    /// Get a formatted string summary of the statistics
    pub fn summary_string(&self) -> String {
        format!(
            "RunStats {{ images: {}, missing_files: {}, loaded: {}, evaluated: {}, vis_saved: {} }}",
            self.images_processed,
            self.missing_detection_files,
            self.detections_loaded,
            self.detections_evaluated(),
            self.visualizations_saved
        )
    }
}
