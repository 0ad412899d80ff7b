//! Core data types for ground truth, detections and box encodings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::metrics::iou::xywh_to_xyxy;

/// Canonical class identifier shared by ground truth and detections.
pub type CategoryId = u64;

/// Four box coordinates. How they are read depends on a [`BoxFormat`].
pub type BBox = [f64; 4];

/// Coordinate encoding of a [`BBox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxFormat {
    /// `[x_min, y_min, x_max, y_max]`
    #[default]
    Xyxy,
    /// `[x_min, y_min, width, height]` (COCO)
    Xywh,
}

impl BoxFormat {
    /// Normalize a box in this encoding to `xyxy`.
    #[must_use]
    pub fn to_xyxy(self, bbox: BBox) -> BBox {
        match self {
            BoxFormat::Xyxy => bbox,
            BoxFormat::Xywh => xywh_to_xyxy(bbox),
        }
    }
}

/// Represents a category in the COCO dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

/// Represents an image in the COCO dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

/// Represents a ground-truth annotation as stored in COCO JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub id: u64,
    pub image_id: u64,
    pub category_id: CategoryId,
    /// Bounding box in [x, y, width, height] format
    pub bbox: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,
}

/// Represents a complete COCO ground-truth file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoDataset {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

/// A validated ground-truth box. `bbox` is in `xywh`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundTruth {
    pub category_id: CategoryId,
    pub bbox: BBox,
}

impl GroundTruth {
    pub fn new(category_id: CategoryId, bbox: BBox) -> Self {
        Self { category_id, bbox }
    }

    /// The box as `[x_min, y_min, x_max, y_max]`.
    pub fn xyxy(&self) -> BBox {
        BoxFormat::Xywh.to_xyxy(self.bbox)
    }
}

/// A score-carrying detection in canonical form. `bbox` is in `xyxy`.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub category_id: CategoryId,
    pub bbox: BBox,
    pub score: f64,
    /// Label string reported by the detector, if any.
    pub label: Option<String>,
}

impl Detection {
    pub fn new(category_id: CategoryId, bbox: BBox, score: f64) -> Self {
        Self {
            category_id,
            bbox,
            score,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Ground truth after validation, grouped per image.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthSet {
    pub images: Vec<Image>,
    pub categories: Vec<Category>,
    by_image: HashMap<u64, Vec<GroundTruth>>,
}

impl GroundTruthSet {
    pub fn new(
        images: Vec<Image>,
        categories: Vec<Category>,
        ground_truths: Vec<(u64, GroundTruth)>,
    ) -> Self {
        let mut by_image: HashMap<u64, Vec<GroundTruth>> = HashMap::new();
        for (image_id, gt) in ground_truths {
            by_image.entry(image_id).or_default().push(gt);
        }
        Self {
            images,
            categories,
            by_image,
        }
    }

    /// Ground truths of one image, in file order. Empty if the image has none.
    pub fn ground_truths(&self, image_id: u64) -> &[GroundTruth] {
        self.by_image.get(&image_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Display names keyed by category id. Used only when rendering.
    pub fn category_names(&self) -> BTreeMap<CategoryId, String> {
        self.categories
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }

    /// Total number of ground-truth boxes across all images.
    pub fn annotation_count(&self) -> usize {
        self.by_image.values().map(Vec::len).sum()
    }
}
