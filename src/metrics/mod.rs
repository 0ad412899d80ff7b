//! Box geometry metrics.

pub mod iou;

pub use iou::{calculate_iou, xywh_to_xyxy, xyxy_to_xywh};
