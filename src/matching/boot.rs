//! Boot matching: an ordered list of passes, each looser than the last, stopping at the
//! first pass that yields any boot.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use crate::appearance::Appearance;
use crate::common::PpeBox;
use crate::data::{BootConfig, BootPassGates, MatcherConfig};
use crate::matching::top_k_by_iou;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BootPass {
    /// Foot band, bottom-edge alignment, vest exclusion and skin rejection.
    Strict,
    /// Wider bands; skin only rejects when the crop is also edge-poor.
    Relaxed,
    /// Foot band and person overlap only.
    LastResort,
}

impl BootPass {
    /// Passes run for a given fallback setting, in order.
    pub fn escalation(relax_fallback: bool) -> Vec<BootPass> {
        if relax_fallback {
            vec![BootPass::Strict, BootPass::Relaxed, BootPass::LastResort]
        } else {
            vec![BootPass::Strict]
        }
    }

    fn admits(&self, cand: &PpeBox, ctx: &BootContext, config: &BootConfig) -> bool {
        match self {
            BootPass::Strict => admits_strict(cand, ctx, config),
            BootPass::Relaxed => admits_relaxed(cand, ctx, config),
            BootPass::LastResort => {
                in_foot_band(cand, &ctx.person, config.last_resort_foot_min, config.last_resort_foot_max)
                    && ctx.person.iou(cand) >= config.last_resort_min_person_iou
            }
        }
    }
}

struct BootContext<'a> {
    person: PpeBox,
    vest: Option<&'a PpeBox>,
    frame: Option<&'a RgbImage>,
}

fn in_foot_band(cand: &PpeBox, person: &PpeBox, lo: f32, hi: f32) -> bool {
    let ph = person.height();
    let cy = cand.cy();
    cy >= person.y1 + lo * ph && cy <= person.y1 + hi * ph
}

fn in_area_band(cand: &PpeBox, person: &PpeBox, gates: &BootPassGates) -> bool {
    let (area, person_area) = (cand.area(), person.area());
    area >= gates.min_area * person_area && area <= gates.max_area * person_area
}

/// Allowed distance between boot and person bottom edges, as a fraction of person height.
///
/// Widened for short person boxes and for persons cut off by the bottom of the frame.
pub fn align_eps(person: &PpeBox, frame_height: Option<u32>, config: &BootConfig) -> f32 {
    let mut eps = if config.strict_boots { config.tight_align_eps } else { config.align_eps };
    if person.height() < config.small_person_height {
        eps *= config.align_widen;
    }
    if let Some(height) = frame_height {
        if person.y2 >= config.frame_bottom_frac * height as f32 {
            eps *= config.align_widen;
        }
    }
    eps
}

fn admits_strict(cand: &PpeBox, ctx: &BootContext, config: &BootConfig) -> bool {
    let person = &ctx.person;
    if let Some(vest) = ctx.vest {
        if cand.iou(vest) >= config.vest_exclusion_iou {
            return false;
        }
    }
    if !in_area_band(cand, person, &config.strict) {
        return false;
    }
    let (foot_min, foot_max) = if config.strict_boots {
        (config.tight_foot_min, config.tight_foot_max)
    } else {
        (config.strict.foot_min, config.strict.foot_max)
    };
    if !in_foot_band(cand, person, foot_min, foot_max) {
        return false;
    }
    let eps = align_eps(person, ctx.frame.map(|f| f.height()), config);
    if (person.y2 - cand.y2).abs() > eps * person.height() {
        return false;
    }
    if person.iou(cand) < config.strict.min_person_iou {
        return false;
    }
    match ctx.frame {
        Some(frame) => {
            let look = Appearance::measure(frame, cand);
            let boot_like = look.mean_value < config.dark_value_max
                || look.edge_density > config.edge_density_min
                || look.mean_saturation > config.saturation_min;
            !(look.skin_ratio > config.skin_reject_ratio && !boot_like)
        }
        None => true,
    }
}

fn admits_relaxed(cand: &PpeBox, ctx: &BootContext, config: &BootConfig) -> bool {
    let person = &ctx.person;
    let gates = &config.relaxed;
    if !in_area_band(cand, person, gates)
        || !in_foot_band(cand, person, gates.foot_min, gates.foot_max)
        || person.iou(cand) < gates.min_person_iou
    {
        return false;
    }
    match ctx.frame {
        Some(frame) => {
            let look = Appearance::measure(frame, cand);
            !(look.edge_density <= config.relaxed_edge_floor && look.skin_ratio > config.relaxed_skin_ratio)
        }
        None => true,
    }
}

/// Runs `passes` in order and returns the first non-empty top-k selection and its pass.
pub fn match_boots_with(
    passes: &[BootPass],
    person: &PpeBox,
    boots: &[PpeBox],
    vest: Option<&PpeBox>,
    frame: Option<&RgbImage>,
    config: &MatcherConfig,
) -> (Vec<PpeBox>, Option<BootPass>) {
    let ctx = BootContext {
        person: *person,
        vest,
        frame,
    };
    for pass in passes {
        let valid: Vec<PpeBox> = boots
            .iter()
            .filter(|bb| pass.admits(bb, &ctx, &config.boot))
            .copied()
            .collect();
        let picked = top_k_by_iou(&valid, person, config.max_matches, config.distinct_iou);
        if !picked.is_empty() {
            return (picked, Some(*pass));
        }
    }
    (Vec::new(), None)
}

/// Boot matching with the escalation configured in `config.boot.relax_fallback`.
pub fn match_boots(
    person: &PpeBox,
    boots: &[PpeBox],
    vest: Option<&PpeBox>,
    frame: Option<&RgbImage>,
    config: &MatcherConfig,
) -> (Vec<PpeBox>, Option<BootPass>) {
    let passes = BootPass::escalation(config.boot.relax_fallback);
    match_boots_with(&passes, person, boots, vest, frame, config)
}
