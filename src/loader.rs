//! JSON loading for COCO ground truth and per-image detection files.

use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::types::{BBox, CategoryId, CocoDataset, Detection, GroundTruth, GroundTruthSet};

/// Load COCO ground truth from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if it declares no
/// categories, or if any annotation box is malformed.
///
/// # Example
///
/// ```no_run
/// use det_analysis::loader::load_ground_truth;
///
/// let gt = load_ground_truth("annotations.json").unwrap();
/// println!("Loaded {} annotations", gt.annotation_count());
/// ```
pub fn load_ground_truth<P: AsRef<Path>>(path: P) -> Result<GroundTruthSet> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let dataset: CocoDataset = serde_json::from_reader(reader)?;
    into_ground_truth_set(dataset)
}

/// Load COCO ground truth from a JSON string.
///
/// # Example
///
/// ```
/// use det_analysis::loader::load_ground_truth_str;
///
/// let json = r#"{
///     "images": [{"id": 1, "file_name": "a.jpg"}],
///     "annotations": [],
///     "categories": [{"id": 1, "name": "person"}]
/// }"#;
/// let gt = load_ground_truth_str(json).unwrap();
/// assert_eq!(gt.images.len(), 1);
/// ```
pub fn load_ground_truth_str(json_str: &str) -> Result<GroundTruthSet> {
    let dataset: CocoDataset = serde_json::from_str(json_str)?;
    into_ground_truth_set(dataset)
}

/// Validate a raw COCO dataset and convert its annotations to [`GroundTruth`].
pub fn into_ground_truth_set(dataset: CocoDataset) -> Result<GroundTruthSet> {
    if dataset.categories.is_empty() {
        return Err(AnalysisError::EmptyDataset(
            "Dataset must contain at least one category".to_string(),
        ));
    }

    let mut ground_truths = Vec::with_capacity(dataset.annotations.len());
    for annotation in &dataset.annotations {
        let bbox = to_bbox(&annotation.bbox).map_err(|reason| {
            AnalysisError::InvalidAnnotation(format!(
                "Annotation {} has invalid bbox: {}",
                annotation.id, reason
            ))
        })?;

        if bbox[2] < 0.0 || bbox[3] < 0.0 {
            return Err(AnalysisError::InvalidBoundingBox(format!(
                "Annotation {} has negative dimensions",
                annotation.id
            )));
        }

        ground_truths.push((
            annotation.image_id,
            GroundTruth::new(annotation.category_id, bbox),
        ));
    }

    Ok(GroundTruthSet::new(
        dataset.images,
        dataset.categories,
        ground_truths,
    ))
}

/// Take exactly four finite coordinates.
fn to_bbox(values: &[f64]) -> std::result::Result<BBox, String> {
    let bbox: BBox = values
        .try_into()
        .map_err(|_| format!("expected 4 values, got {}", values.len()))?;
    if bbox.iter().any(|v| !v.is_finite()) {
        return Err("coordinates must be finite".to_string());
    }
    Ok(bbox)
}

/// Path of the detection file that belongs to an image: `<det_dir>/<stem>.json`.
///
/// # Example
///
/// ```
/// use det_analysis::loader::detection_path;
/// use std::path::Path;
///
/// let path = detection_path("dets", "train/0001.jpg");
/// assert_eq!(path, Path::new("dets").join("0001.json"));
/// ```
pub fn detection_path<P: AsRef<Path>>(det_dir: P, file_name: &str) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    det_dir.as_ref().join(format!("{stem}.json"))
}

/// One record of the `instances` detection shape.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceRecord {
    /// `[x1, y1, x2, y2]`
    pub bbox: Vec<f64>,
    pub label_id: CategoryId,
    #[serde(default)]
    pub label: Option<String>,
    pub score: f64,
}

/// `{"instances": [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct InstancesFile {
    pub instances: Vec<InstanceRecord>,
}

/// `{"bboxes": [...], "labels": [...], "scores": [...]}` (parallel arrays).
#[derive(Debug, Clone, Deserialize)]
pub struct ArraysFile {
    pub bboxes: Vec<Vec<f64>>,
    pub labels: Vec<CategoryId>,
    pub scores: Vec<f64>,
}

/// The two detection file shapes the loader accepts.
#[derive(Debug, Clone)]
pub enum DetectionFile {
    Instances(InstancesFile),
    Arrays(ArraysFile),
}

impl DetectionFile {
    /// Recognize the shape of a parsed JSON document.
    ///
    /// Returns `Ok(None)` for documents that are neither shape, which are
    /// treated as carrying no detections.
    pub fn from_value(value: Value) -> Result<Option<Self>> {
        if value.get("instances").is_some() {
            Ok(Some(DetectionFile::Instances(serde_json::from_value(value)?)))
        } else if value.get("bboxes").is_some() {
            Ok(Some(DetectionFile::Arrays(serde_json::from_value(value)?)))
        } else {
            Ok(None)
        }
    }

    /// Normalize into canonical [`Detection`] records, in file order.
    pub fn into_detections(self) -> Result<Vec<Detection>> {
        match self {
            DetectionFile::Instances(file) => file
                .instances
                .into_iter()
                .enumerate()
                .map(|(idx, inst)| -> Result<Detection> {
                    let bbox = detection_bbox(&inst.bbox, idx)?;
                    let det = Detection::new(inst.label_id, bbox, detection_score(inst.score, idx)?);
                    Ok(match inst.label {
                        Some(label) => det.with_label(label),
                        None => det,
                    })
                })
                .collect(),
            DetectionFile::Arrays(file) => {
                if file.bboxes.len() != file.labels.len() || file.bboxes.len() != file.scores.len() {
                    return Err(AnalysisError::InvalidAnnotation(format!(
                        "Detection arrays differ in length: {} bboxes, {} labels, {} scores",
                        file.bboxes.len(),
                        file.labels.len(),
                        file.scores.len()
                    )));
                }
                file.bboxes
                    .iter()
                    .zip(file.labels.iter().zip(file.scores.iter()))
                    .enumerate()
                    .map(|(idx, (bbox, (&label, &score)))| -> Result<Detection> {
                        // Extra trailing values (e.g. an embedded score) are ignored.
                        let head = &bbox[..bbox.len().min(4)];
                        Ok(Detection::new(label, detection_bbox(head, idx)?, detection_score(score, idx)?))
                    })
                    .collect()
            }
        }
    }
}

fn detection_bbox(values: &[f64], idx: usize) -> Result<BBox> {
    let bbox = to_bbox(values).map_err(|reason| {
        AnalysisError::InvalidAnnotation(format!("Detection {} has invalid bbox: {}", idx, reason))
    })?;
    if bbox[2] < bbox[0] || bbox[3] < bbox[1] {
        return Err(AnalysisError::InvalidBoundingBox(format!(
            "Detection {} has max corner before min corner",
            idx
        )));
    }
    Ok(bbox)
}

fn detection_score(score: f64, idx: usize) -> Result<f64> {
    if !(0.0..=1.0).contains(&score) {
        return Err(AnalysisError::InvalidAnnotation(format!(
            "Detection {} has score {} outside [0, 1]",
            idx, score
        )));
    }
    Ok(score)
}

/// Parse a detection JSON document into canonical detections (unfiltered).
pub fn load_detections_str(json_str: &str) -> Result<Vec<Detection>> {
    let value: Value = serde_json::from_str(json_str)?;
    parse_detections(value)
}

fn parse_detections(value: Value) -> Result<Vec<Detection>> {
    match DetectionFile::from_value(value)? {
        Some(file) => file.into_detections(),
        None => {
            log::warn!("Detection document has neither 'instances' nor 'bboxes', treating it as empty");
            Ok(Vec::new())
        }
    }
}

/// Load the detections of one image.
///
/// Returns `Ok(None)` when the file does not exist, which callers treat as an
/// image without detections.
pub fn load_detections<P: AsRef<Path>>(path: P) -> Result<Option<Vec<Detection>>> {
    let path = path.as_ref();
    log::debug!("Looking for: {}", path.display());
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    parse_detections(value).map(Some)
}
