use crate::common::{PpeBox, ScoredBox};
use crate::data::DedupConfig;

pub trait Nms {
    fn bbox(&self) -> &PpeBox;
    fn confidence(&self) -> f32;

    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        self.bbox().iou(other.bbox())
    }
}

/// Greedy non-maximum suppression.
///
/// Visits items by descending confidence (ties keep their input order) and drops every
/// later item whose IOU with a kept one is at or above `iou_thr`. Output is in visit order.
pub fn nms<T: Nms + Clone>(items: &[T], iou_thr: f32) -> Vec<T> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| items[b].confidence().total_cmp(&items[a].confidence()));

    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for i in order {
        let candidate = &items[i];
        if kept.iter().all(|k| k.iou(candidate) < iou_thr) {
            kept.push(candidate.clone());
        }
    }
    kept
}

/// Merges pairs whose centers lie within `center_eps` of the frame diagonal and whose
/// IOU reaches `iou_min`, keeping the higher-confidence box (then the larger one, then
/// the earlier one).
///
/// Catches duplicates produced by separate detector passes that per-pass NMS misses.
pub fn dedup_by_center<T: Nms + Clone>(items: &[T], width: u32, height: u32, center_eps: f32, iou_min: f32) -> Vec<T> {
    if items.len() <= 1 {
        return items.to_vec();
    }
    let (w, h) = (width as f32, height as f32);
    let max_dist = center_eps * (w * w + h * h).sqrt();

    let mut keep = vec![true; items.len()];
    for i in 0..items.len() {
        if !keep[i] {
            continue;
        }
        let (ix, iy) = items[i].bbox().center();
        for j in (i + 1)..items.len() {
            if !keep[j] {
                continue;
            }
            let (jx, jy) = items[j].bbox().center();
            let dist = ((ix - jx).powi(2) + (iy - jy).powi(2)).sqrt();
            if dist > max_dist || items[i].iou(&items[j]) < iou_min {
                continue;
            }
            if prefers_first(&items[i], &items[j]) {
                keep[j] = false;
            } else {
                keep[i] = false;
                break;
            }
        }
    }

    items.iter()
        .zip(keep)
        .filter_map(|(item, k)| k.then(|| item.clone()))
        .collect()
}

fn prefers_first<T: Nms>(a: &T, b: &T) -> bool {
    if a.confidence() != b.confidence() {
        return a.confidence() > b.confidence();
    }
    a.bbox().area() >= b.bbox().area()
}

/// NMS followed by the center-distance merge. Idempotent: feeding the output back in
/// returns it unchanged.
pub fn dedup_persons(persons: &[ScoredBox], config: &DedupConfig, width: u32, height: u32) -> Vec<ScoredBox> {
    let kept = nms(persons, config.nms_iou);
    dedup_by_center(&kept, width, height, config.center_eps, config.center_iou_min)
}
