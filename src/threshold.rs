//! Score and IoU threshold utilities.

use crate::error::{AnalysisError, Result};
use crate::types::Detection;

/// Filter detections by confidence score threshold.
///
/// # Arguments
///
/// * `detections` - Detections to filter
/// * `threshold` - Minimum confidence score (0.0 to 1.0)
///
/// # Returns
///
/// Returns a new vector containing only detections with score >= threshold,
/// in their original order.
///
/// # Errors
///
/// Returns an error if the threshold is not in the valid range [0.0, 1.0].
///
/// # Example
///
/// ```
/// use det_analysis::threshold::filter_by_score;
/// use det_analysis::types::Detection;
///
/// let detections = vec![
///     Detection::new(1, [10.0, 20.0, 30.0, 40.0], 0.9),
///     Detection::new(1, [50.0, 60.0, 70.0, 80.0], 0.3),
/// ];
///
/// let filtered = filter_by_score(&detections, 0.5).unwrap();
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_score(detections: &[Detection], threshold: f64) -> Result<Vec<Detection>> {
    validate_threshold(threshold)?;

    Ok(detections
        .iter()
        .filter(|det| det.score >= threshold)
        .cloned()
        .collect())
}

/// Validate that a threshold is in the valid range [0.0, 1.0].
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::InvalidThreshold(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_score() {
        let detections = vec![
            Detection::new(1, [10.0, 20.0, 30.0, 40.0], 0.9),
            Detection::new(1, [50.0, 60.0, 70.0, 80.0], 0.3),
            Detection::new(2, [0.0, 0.0, 1.0, 1.0], 0.5),
        ];

        let filtered = filter_by_score(&detections, 0.5).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].score, 0.9);
        assert_eq!(filtered[1].category_id, 2);
    }

    #[test]
    fn test_invalid_threshold() {
        let detections = vec![];
        assert!(filter_by_score(&detections, 1.5).is_err());
        assert!(filter_by_score(&detections, -0.1).is_err());
        assert!(filter_by_score(&detections, f64::NAN).is_err());
    }

    #[test]
    fn test_boundary_thresholds() {
        assert!(validate_threshold(0.0).is_ok());
        assert!(validate_threshold(1.0).is_ok());
    }
}
