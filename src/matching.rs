//! Decides which equipment boxes belong to one person.

pub mod boot;

use image::RgbImage;
use crate::common::PpeBox;
use crate::data::{ComplianceOutcome, MatcherConfig};
use crate::label_resolver::CandidateSet;

pub use boot::{match_boots, match_boots_with, BootPass};

/// Matcher output for one person: the outcome plus which boot pass matched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonMatch {
    pub outcome: ComplianceOutcome,
    pub boot_pass: Option<BootPass>,
}

/// Up to `k` candidates with the highest person IOU whose pairwise IOU stays below
/// `distinct_iou`. Equal IOUs keep input order.
pub fn top_k_by_iou(candidates: &[PpeBox], person: &PpeBox, k: usize, distinct_iou: f32) -> Vec<PpeBox> {
    let mut scored: Vec<(f32, PpeBox)> = candidates.iter().map(|c| (person.iou(c), *c)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut picked: Vec<PpeBox> = Vec::with_capacity(k);
    for (_, cand) in scored {
        if picked.len() >= k {
            break;
        }
        if picked.iter().all(|p| cand.iou(p) < distinct_iou) {
            picked.push(cand);
        }
    }
    picked
}

fn in_area_band(cand: &PpeBox, person_area: f32, min: f32, max: f32) -> bool {
    let area = cand.area();
    area >= min * person_area && area <= max * person_area
}

/// First candidate with the strictly highest person IOU, ignoring zero-overlap boxes.
fn best_by_iou<'a>(person: &PpeBox, candidates: impl Iterator<Item = &'a PpeBox>) -> Option<PpeBox> {
    let mut best: Option<(f32, PpeBox)> = None;
    for cand in candidates {
        let iou = person.iou(cand);
        if iou <= 0. {
            continue;
        }
        if best.map_or(true, |(b, _)| iou > b) {
            best = Some((iou, *cand));
        }
    }
    best.map(|(_, b)| b)
}

pub fn match_helmet(person: &PpeBox, helmets: &[PpeBox], config: &MatcherConfig) -> Option<PpeBox> {
    if config.relaxed {
        return best_by_iou(person, helmets.iter());
    }
    let gates = &config.helmet;
    let person_area = person.area();
    let head_limit = person.y1 + gates.head_frac * person.height();
    best_by_iou(person, helmets.iter().filter(|hb| {
        let center = hb.center();
        in_area_band(hb, person_area, gates.min_area, gates.max_area)
            && person.contains_point(center)
            && center.1 <= head_limit
            && person.iou(hb) >= gates.min_person_iou
    }))
}

pub fn match_vest(person: &PpeBox, vests: &[PpeBox], config: &MatcherConfig) -> Option<PpeBox> {
    if config.relaxed {
        return best_by_iou(person, vests.iter());
    }
    let gates = &config.vest;
    let person_area = person.area();
    best_by_iou(person, vests.iter().filter(|vb| {
        in_area_band(vb, person_area, gates.min_area, gates.max_area)
            && person.iou(vb) >= gates.min_person_iou
    }))
}

/// Gloves always go through the hand band, relaxed mode or not.
pub fn match_gloves(person: &PpeBox, gloves: &[PpeBox], config: &MatcherConfig) -> Vec<PpeBox> {
    let gates = &config.glove;
    let person_area = person.area();
    let ph = person.height();
    let (band_lo, band_hi) = (person.y1 + gates.band_min * ph, person.y1 + gates.band_max * ph);

    let valid: Vec<PpeBox> = gloves
        .iter()
        .filter(|gb| {
            let center = gb.center();
            in_area_band(gb, person_area, gates.min_area, gates.max_area)
                && person.contains_point(center)
                && center.1 >= band_lo
                && center.1 <= band_hi
                && person.coverage_of(gb) >= gates.min_coverage
        })
        .copied()
        .collect();
    top_k_by_iou(&valid, person, config.max_matches, config.distinct_iou)
}

/// Matches every category for one person box.
pub fn match_person(person: &PpeBox, candidates: &CandidateSet, frame: Option<&RgbImage>, config: &MatcherConfig) -> PersonMatch {
    let helmet = match_helmet(person, &candidates.helmets, config);
    let vest = match_vest(person, &candidates.vests, config);
    let gloves = match_gloves(person, &candidates.gloves, config);
    let (boots, boot_pass) = match_boots(person, &candidates.boots, vest.as_ref(), frame, config);

    let glove_need = if config.require_two_gloves { 2 } else { 1 };
    let boot_need = if config.boot.require_two_boots { 2 } else { 1 };

    PersonMatch {
        outcome: ComplianceOutcome {
            helmet_ok: helmet.is_some(),
            vest_ok: vest.is_some(),
            glove_ok: gloves.len() >= glove_need,
            boot_ok: boots.len() >= boot_need,
            helmet,
            vest,
            gloves,
            boots,
        },
        boot_pass,
    }
}
