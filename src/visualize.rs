//! Drawing ground-truth and detection boxes onto source images.

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::types::{BBox, CategoryId, Detection, GroundTruth};

pub const GROUND_TRUTH_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
pub const DETECTION_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);

const LINE_WIDTH: u32 = 2;
const LABEL_OFFSET: i32 = 10;
const LABEL_SCALE: f32 = 12.0;

/// Load a TTF/OTF font for box labels.
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let bytes = fs::read(path.as_ref())?;
    FontVec::try_from_vec(bytes)
        .map_err(|err| AnalysisError::FontError(format!("{}: {}", path.as_ref().display(), err)))
}

/// Output path of an image's visualization: `<vis_dir>/<stem>_vis.jpg`.
pub fn visualization_path<P: AsRef<Path>>(vis_dir: P, file_name: &str) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    vis_dir.as_ref().join(format!("{stem}_vis.jpg"))
}

/// Pixel rectangle covering `[x1, y1, x2, y2]` inclusively, at least 1x1.
///
/// Coordinates are clamped to a margin just outside the image, so edges that
/// fall off the canvas stay invisible and arbitrarily large boxes cannot
/// overflow the pixel arithmetic.
fn to_rect(xyxy: &BBox, width: u32, height: u32) -> Rect {
    let margin = f64::from(LINE_WIDTH);
    let clamp_x = |v: f64| v.round().clamp(-margin, f64::from(width) + margin) as i64;
    let clamp_y = |v: f64| v.round().clamp(-margin, f64::from(height) + margin) as i64;
    let (x1, y1) = (clamp_x(xyxy[0]), clamp_y(xyxy[1]));
    let (x2, y2) = (clamp_x(xyxy[2]), clamp_y(xyxy[3]));
    let rect_width = (x2 - x1 + 1).max(1) as u32;
    let rect_height = (y2 - y1 + 1).max(1) as u32;
    Rect::at(x1 as i32, y1 as i32).of_size(rect_width, rect_height)
}

fn draw_box(image: &mut RgbImage, xyxy: &BBox, colour: Rgb<u8>) {
    let outer = to_rect(xyxy, image.width(), image.height());
    draw_hollow_rect_mut(image, outer, colour);
    // Thicken inwards, like an outline of width LINE_WIDTH.
    for inset in 1..LINE_WIDTH {
        let shrink = 2 * inset;
        if outer.width() <= shrink || outer.height() <= shrink {
            break;
        }
        let inner = Rect::at(outer.left() + inset as i32, outer.top() + inset as i32)
            .of_size(outer.width() - shrink, outer.height() - shrink);
        draw_hollow_rect_mut(image, inner, colour);
    }
}

fn draw_label(image: &mut RgbImage, xyxy: &BBox, colour: Rgb<u8>, font: &FontVec, text: &str) {
    if text.is_empty() {
        return;
    }
    let x = xyxy[0].round().clamp(0.0, f64::from(image.width())) as i32;
    let y = (xyxy[1].round() - f64::from(LABEL_OFFSET)).clamp(0.0, f64::from(image.height())) as i32;
    draw_text_mut(image, colour, x, y, PxScale::from(LABEL_SCALE), font, text);
}

/// Draw ground truths in lime and detections in red.
///
/// Ground truths are labelled with their class name (or id). Detections are
/// labelled `name:score`, falling back to the detector's own label. Labels are
/// only drawn when a font is supplied.
pub fn render(
    image: &mut RgbImage,
    ground_truths: &[GroundTruth],
    detections: &[Detection],
    names: &BTreeMap<CategoryId, String>,
    font: Option<&FontVec>,
) {
    for gt in ground_truths {
        let xyxy = gt.xyxy();
        draw_box(image, &xyxy, GROUND_TRUTH_COLOUR);
        if let Some(font) = font {
            let name = names
                .get(&gt.category_id)
                .cloned()
                .unwrap_or_else(|| gt.category_id.to_string());
            draw_label(image, &xyxy, GROUND_TRUTH_COLOUR, font, &name);
        }
    }

    for det in detections {
        draw_box(image, &det.bbox, DETECTION_COLOUR);
        if let Some(font) = font {
            let name = names
                .get(&det.category_id)
                .map(String::as_str)
                .or(det.label.as_deref())
                .unwrap_or("");
            let text = format!("{}:{:.2}", name, det.score);
            draw_label(image, &det.bbox, DETECTION_COLOUR, font, &text);
        }
    }
}

/// Render one image from `img_dir` and save it under `vis_dir`.
///
/// Returns `Ok(None)` when the source image does not exist.
pub fn save_visualization(
    img_dir: &Path,
    vis_dir: &Path,
    file_name: &str,
    ground_truths: &[GroundTruth],
    detections: &[Detection],
    names: &BTreeMap<CategoryId, String>,
    font: Option<&FontVec>,
) -> Result<Option<PathBuf>> {
    let source = img_dir.join(file_name);
    if !source.exists() {
        log::debug!("No source image at {}, skipping visualization", source.display());
        return Ok(None);
    }

    let mut image = image::open(&source)?.to_rgb8();
    render(&mut image, ground_truths, detections, names, font);

    fs::create_dir_all(vis_dir)?;
    let target = visualization_path(vis_dir, file_name);
    image.save(&target)?;
    Ok(Some(target))
}
