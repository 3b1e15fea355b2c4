//! Debug overlay: equipment boxes, person boxes and a status bar per person.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use crate::common::{PpeBox, PpeClass};
use crate::data::PersonReport;

const PERSON_OK: Rgb<u8> = Rgb([0, 200, 0]);
const PERSON_BAD: Rgb<u8> = Rgb([255, 0, 0]);
const BAR_BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);

pub(crate) fn get_class_colour(class: PpeClass) -> Rgb<u8> {
    match class {
        PpeClass::Helmet => Rgb([60, 220, 60]),   // green
        PpeClass::Vest => Rgb([255, 255, 0]),     // yellow
        PpeClass::Glove => Rgb([0, 255, 255]),    // cyan
        PpeClass::Boot => Rgb([255, 180, 40]),    // orange
        PpeClass::Person => Rgb([128, 0, 128]),   // purple
    }
}

/// Status-bar scale for a person box of height `h`.
fn fscale(h: f32) -> f32 {
    (h / 400.).clamp(0.4, 1.2)
}

/// Rect for `(x, y, w, h)` if it has a drawable size.
fn rect(x: i32, y: i32, w: i32, h: i32) -> Option<Rect> {
    (w > 0 && h > 0).then(|| Rect::at(x, y).of_size(w as u32, h as u32))
}

/// `b` clamped to the image, or `None` when nothing of it is visible.
fn visible(img: &RgbImage, b: &PpeBox) -> Option<PpeBox> {
    let clamped = b.clamped(img.width(), img.height());
    (!clamped.is_degenerate()).then_some(clamped)
}

/// Outlines the visible part of `b` with a `thickness`-pixel border.
pub fn draw_part_box(img: &mut RgbImage, b: &PpeBox, colour: Rgb<u8>, thickness: i32) {
    let Some(b) = visible(img, b) else {
        return;
    };
    let (x, y, w, h) = b.as_xy_wh_i32();
    for t in 0..thickness {
        if let Some(r) = rect(x + t, y + t, w - 2 * t, h - 2 * t) {
            draw_hollow_rect_mut(img, r, colour);
        }
    }
}

/// Draws the person box and a bar of four status pips (helmet, vest, gloves, boots)
/// above it, shifted to stay inside the frame. Persons entirely outside the frame draw nothing.
pub fn draw_person_box(img: &mut RgbImage, person: &PpeBox, status: [bool; 4], ok: bool) {
    let Some(person) = visible(img, person) else {
        return;
    };
    let colour = if ok { PERSON_OK } else { PERSON_BAD };
    draw_part_box(img, &person, colour, 2);

    let (x1, y1, _, h) = person.as_xy_wh_i32();
    let pad = 4;
    let pip = (14. * fscale(h.max(1) as f32)) as i32 + 4;
    let bar_w = pad + status.len() as i32 * (pip + pad);
    let bar_h = pip + 2 * pad;

    let y0 = y1.saturating_sub(bar_h).max(0);
    let mut x0 = x1.max(0);
    if x0 + bar_w > img.width() as i32 {
        x0 = (img.width() as i32 - bar_w).max(0);
    }

    if let Some(r) = rect(x0, y0, bar_w, bar_h) {
        draw_filled_rect_mut(img, r, BAR_BACKGROUND);
        draw_hollow_rect_mut(img, r, colour);
    }
    for (i, item_ok) in status.iter().enumerate() {
        let px = x0 + pad + i as i32 * (pip + pad);
        if let Some(r) = rect(px, y0 + pad, pip, pip) {
            draw_filled_rect_mut(img, r, if *item_ok { PERSON_OK } else { PERSON_BAD });
        }
    }
}

/// Draws everything the engine matched for one person.
pub fn annotate_person(img: &mut RgbImage, report: &PersonReport) {
    let outcome = &report.outcome;
    for class in PpeClass::EQUIPMENT {
        for b in outcome.boxes(class) {
            draw_part_box(img, &b, get_class_colour(class), 2);
        }
    }
    let status = PpeClass::EQUIPMENT.map(|class| outcome.is_ok(class));
    draw_person_box(img, &report.person, status, outcome.is_fully_compliant());
}
