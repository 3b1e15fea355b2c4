//! Turns a YOLO-style output matrix into frame-space detections.
//!
//! For detector implementations: rows are `[cx, cy, w, h, confidence, class_id]` in model
//! input pixels.

use ndarray::ArrayView2;
use crate::common::PpeDetection;
use crate::detection_runners::nms;

const ROW_LEN: usize = 6;

/// Model-input and frame sizes used to rescale boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleInfo {
    pub model_width: f32,
    pub model_height: f32,
    pub img_width: f32,
    pub img_height: f32,
}

pub fn process_predictions(
    output: &ArrayView2<f32>,
    classes_list: &[String],
    scale: ScaleInfo,
    min_conf: f32,
    iou_thr: f32,
) -> anyhow::Result<Vec<PpeDetection>> {
    let (_, cols) = output.dim();
    if cols < ROW_LEN {
        anyhow::bail!("expected at least {} values per prediction, got {}", ROW_LEN, cols);
    }
    if !(scale.model_width > 0. && scale.model_height > 0.) {
        anyhow::bail!("model input size {}x{} is empty", scale.model_width, scale.model_height);
    }

    let sx = scale.img_width / scale.model_width;
    let sy = scale.img_height / scale.model_height;

    let mut detections = Vec::new();
    for row in output.outer_iter() {
        let prob = row[4];
        if !(prob >= min_conf) {
            continue;
        }
        let class = row[5];
        if !(class.is_finite() && class >= 0.) {
            continue;
        }
        let class_id = class as usize;

        let mut det = PpeDetection::default()
            .with_cxcy_wh(row[0] * sx, row[1] * sy, row[2] * sx, row[3] * sy)
            .with_confidence(prob.min(1.))
            .with_class_id(class_id);
        if let Some(label) = classes_list.get(class_id) {
            det = det.with_label(label);
        }
        detections.push(det);
    }

    Ok(nms(&detections, iou_thr))
}
