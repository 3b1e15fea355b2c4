//! Colour and texture cues over a frame crop, used to tell boots from bare skin.
//!
//! Hue is on the 0..180 scale and saturation/value/chroma on 0..255, matching the usual
//! 8-bit colour-space conventions the skin windows were tuned on. Frames are RGB.

use image::{imageops, RgbImage};
use imageproc::edges::canny;
use crate::common::PpeBox;

/// Crops with a side shorter than this report no skin and no edges.
pub const MIN_SIDE: u32 = 6;

const CANNY_LOW: f32 = 60.;
const CANNY_HIGH: f32 = 140.;

/// Cues measured over one candidate crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Fraction of pixels inside either skin window.
    pub skin_ratio: f32,
    /// Fraction of Canny edge pixels.
    pub edge_density: f32,
    /// Mean HSV saturation in `[0, 1]`.
    pub mean_saturation: f32,
    /// Mean HSV value in `[0, 1]`.
    pub mean_value: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            skin_ratio: 0.,
            edge_density: 0.,
            mean_saturation: 0.5,
            mean_value: 0.5,
        }
    }
}

impl Appearance {
    /// Measures `bbox` in `frame`. Boxes that clip to nothing get neutral cues.
    pub fn measure(frame: &RgbImage, bbox: &PpeBox) -> Self {
        match safe_crop(frame, bbox) {
            Some(crop) => Self::of_crop(&crop),
            None => Self::default(),
        }
    }

    fn of_crop(crop: &RgbImage) -> Self {
        let (w, h) = crop.dimensions();
        let n = (w * h) as f32;

        let mut skin = 0usize;
        let (mut sat_sum, mut val_sum) = (0f32, 0f32);
        for px in crop.pixels() {
            let [r, g, b] = px.0;
            let (hue, sat, val) = rgb_to_hsv(r, g, b);
            sat_sum += sat;
            val_sum += val;
            if is_skin_hsv(hue, sat, val) || is_skin_ycrcb(r, g, b) {
                skin += 1;
            }
        }

        let small = w < MIN_SIDE || h < MIN_SIDE;
        Self {
            skin_ratio: if small { 0. } else { skin as f32 / n },
            edge_density: if small { 0. } else { edge_density(crop) },
            mean_saturation: sat_sum / n / 255.,
            mean_value: val_sum / n / 255.,
        }
    }
}

/// Fraction of skin-coloured pixels in `bbox`, zero for crops under [`MIN_SIDE`].
pub fn skin_ratio(frame: &RgbImage, bbox: &PpeBox) -> f32 {
    Appearance::measure(frame, bbox).skin_ratio
}

fn edge_density(crop: &RgbImage) -> f32 {
    let gray = imageops::grayscale(crop);
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    let count = edges.pixels().filter(|p| p.0[0] > 0).count();
    count as f32 / (crop.width() * crop.height()) as f32
}

/// Integer crop with corners truncated and clamped to the last row/column.
fn safe_crop(frame: &RgbImage, bbox: &PpeBox) -> Option<RgbImage> {
    let (w, h) = frame.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let clamp = |v: f32, dim: u32| (v as i64).clamp(0, dim as i64 - 1) as u32;
    let (x1, x2) = (clamp(bbox.x1, w), clamp(bbox.x2, w));
    let (y1, y2) = (clamp(bbox.y1, h), clamp(bbox.y2, h));
    if x2 <= x1 || y2 <= y1 {
        return None;
    }
    Some(imageops::crop_imm(frame, x1, y1, x2 - x1, y2 - y1).to_image())
}

/// `(hue 0..180, saturation 0..255, value 0..255)`.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = max - min;

    let sat = if max > 0. { 255. * diff / max } else { 0. };
    let mut hue = if diff == 0. {
        0.
    } else if max == r {
        60. * (g - b) / diff
    } else if max == g {
        120. + 60. * (b - r) / diff
    } else {
        240. + 60. * (r - g) / diff
    };
    if hue < 0. {
        hue += 360.;
    }
    (hue / 2., sat, max)
}

/// `(y, cr, cb)` on the 0..255 scale.
fn rgb_to_ycrcb(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cr = (r - y) * 0.713 + 128.;
    let cb = (b - y) * 0.564 + 128.;
    (y, cr, cb)
}

// Two hue lobes around red.
fn is_skin_hsv(hue: f32, sat: f32, val: f32) -> bool {
    let hue_ok = hue <= 17. || hue >= 170.;
    hue_ok && sat >= 40. && val >= 50.
}

fn is_skin_ycrcb(r: u8, g: u8, b: u8) -> bool {
    let (_, cr, cb) = rgb_to_ycrcb(r, g, b);
    (133. ..=173.).contains(&cr) && (77. ..=135.).contains(&cb)
}
