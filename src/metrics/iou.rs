//! Intersection over Union (IoU) calculation.

use crate::types::{BBox, BoxFormat};

/// Convert bounding box from [x, y, width, height] to [x1, y1, x2, y2]
///
/// # Examples
///
/// ```
/// # use det_analysis::metrics::iou::xywh_to_xyxy;
/// let xywh = [10.0, 20.0, 30.0, 40.0];
/// let xyxy = xywh_to_xyxy(xywh);
/// assert_eq!(xyxy, [10.0, 20.0, 40.0, 60.0]);
/// ```
#[must_use]
pub fn xywh_to_xyxy(bbox: BBox) -> BBox {
    [bbox[0], bbox[1], bbox[0] + bbox[2], bbox[1] + bbox[3]]
}

/// Convert bounding box from [x1, y1, x2, y2] to [x, y, width, height]
///
/// # Examples
///
/// ```
/// # use det_analysis::metrics::iou::xyxy_to_xywh;
/// let xyxy = [10.0, 20.0, 40.0, 60.0];
/// let xywh = xyxy_to_xywh(xyxy);
/// assert_eq!(xywh, [10.0, 20.0, 30.0, 40.0]);
/// ```
#[must_use]
pub fn xyxy_to_xywh(bbox: BBox) -> BBox {
    [bbox[0], bbox[1], bbox[2] - bbox[0], bbox[3] - bbox[1]]
}

/// Area of a box in `xyxy` form. Not clamped, so a zero-width box has zero area.
#[inline]
fn area_xyxy(bbox: &BBox) -> f64 {
    (bbox[2] - bbox[0]) * (bbox[3] - bbox[1])
}

/// Calculate the Intersection over Union (IoU) between two bounding boxes,
/// each given in its own encoding.
///
/// Both boxes are normalized to `xyxy` first. Disjoint boxes yield 0.0 and so
/// does a pair whose union area is zero.
///
/// # Example
///
/// ```
/// use det_analysis::metrics::iou::calculate_iou;
/// use det_analysis::types::BoxFormat;
///
/// let detection = [0.0, 0.0, 10.0, 10.0];
/// let ground_truth = [5.0, 5.0, 10.0, 10.0];
/// let iou = calculate_iou(&detection, BoxFormat::Xyxy, &ground_truth, BoxFormat::Xywh);
/// assert!((iou - 25.0 / 175.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn calculate_iou(box1: &BBox, format1: BoxFormat, box2: &BBox, format2: BoxFormat) -> f64 {
    let a = format1.to_xyxy(*box1);
    let b = format2.to_xyxy(*box2);

    let x_left = a[0].max(b[0]);
    let y_top = a[1].max(b[1]);
    let x_right = a[2].min(b[2]);
    let y_bottom = a[3].min(b[3]);

    let intersection_area = (x_right - x_left).max(0.0) * (y_bottom - y_top).max(0.0);
    let union_area = area_xyxy(&a) + area_xyxy(&b) - intersection_area;

    if union_area > 0.0 {
        intersection_area / union_area
    } else {
        0.0
    }
}
