use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::common::PpeClass;
use crate::data::{LabelShiftFix, LabelThresholds};
use crate::error::EngineError;

/// Person de-duplication settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// IOU at or above which NMS suppresses the lower-scored person box.
    pub nms_iou: f32,
    /// Center distance, as a fraction of the frame diagonal, for the second merge pass.
    pub center_eps: f32,
    /// IOU floor a center-close pair must also reach to merge.
    pub center_iou_min: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            nms_iou: 0.80,
            center_eps: 0.08,
            center_iou_min: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmetGates {
    pub min_area: f32,
    pub max_area: f32,
    /// Helmet center must sit in the top `head_frac` of the person box.
    pub head_frac: f32,
    pub min_person_iou: f32,
}

impl Default for HelmetGates {
    fn default() -> Self {
        Self {
            min_area: 0.004,
            max_area: 0.10,
            head_frac: 0.55,
            min_person_iou: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VestGates {
    pub min_area: f32,
    pub max_area: f32,
    pub min_person_iou: f32,
}

impl Default for VestGates {
    fn default() -> Self {
        Self {
            min_area: 0.05,
            max_area: 0.45,
            min_person_iou: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GloveGates {
    pub min_area: f32,
    pub max_area: f32,
    pub band_min: f32,
    pub band_max: f32,
    /// Fraction of the glove box that must lie inside the person box.
    pub min_coverage: f32,
}

impl Default for GloveGates {
    fn default() -> Self {
        Self {
            min_area: 0.003,
            max_area: 0.06,
            band_min: 0.35,
            band_max: 0.95,
            min_coverage: 0.10,
        }
    }
}

/// Geometric gates of one boot pass. Areas are fractions of the person area,
/// foot bounds fractions of the person height measured from its top edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootPassGates {
    pub min_area: f32,
    pub max_area: f32,
    pub foot_min: f32,
    pub foot_max: f32,
    pub min_person_iou: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub strict_boots: bool,
    pub require_two_boots: bool,
    /// Run the relaxed and last-resort passes when the strict pass finds nothing.
    pub relax_fallback: bool,
    /// Candidates overlapping the matched vest at or above this IOU are ignored by the strict pass.
    pub vest_exclusion_iou: f32,

    pub strict: BootPassGates,
    /// Foot band used instead of `strict`'s when `strict_boots` is set.
    pub tight_foot_min: f32,
    pub tight_foot_max: f32,
    /// Allowed bottom-edge misalignment, as a fraction of person height.
    pub align_eps: f32,
    pub tight_align_eps: f32,
    /// Persons shorter than this (pixels) get a widened alignment tolerance.
    pub small_person_height: f32,
    /// Persons whose bottom edge reaches this fraction of frame height count as truncated.
    pub frame_bottom_frac: f32,
    pub align_widen: f32,

    /// Strict-pass skin rejection and its "looks like a boot" escape hatch.
    pub skin_reject_ratio: f32,
    pub dark_value_max: f32,
    pub edge_density_min: f32,
    pub saturation_min: f32,

    pub relaxed: BootPassGates,
    pub relaxed_skin_ratio: f32,
    pub relaxed_edge_floor: f32,

    pub last_resort_foot_min: f32,
    pub last_resort_foot_max: f32,
    pub last_resort_min_person_iou: f32,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            strict_boots: false,
            require_two_boots: false,
            relax_fallback: true,
            vest_exclusion_iou: 0.35,

            strict: BootPassGates {
                min_area: 0.0035,
                max_area: 0.12,
                foot_min: 0.78,
                foot_max: 1.12,
                min_person_iou: 0.05,
            },
            tight_foot_min: 0.80,
            tight_foot_max: 1.08,
            align_eps: 0.14,
            tight_align_eps: 0.10,
            small_person_height: 160.,
            frame_bottom_frac: 0.98,
            align_widen: 1.8,

            skin_reject_ratio: 0.85,
            dark_value_max: 0.40,
            edge_density_min: 0.025,
            saturation_min: 0.35,

            relaxed: BootPassGates {
                min_area: 0.0032,
                max_area: 0.14,
                foot_min: 0.75,
                foot_max: 1.15,
                min_person_iou: 0.04,
            },
            relaxed_skin_ratio: 0.90,
            relaxed_edge_floor: 0.015,

            last_resort_foot_min: 0.70,
            last_resort_foot_max: 1.10,
            last_resort_min_person_iou: 0.03,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Helmet and vest skip their gates and take the candidate with the highest person IOU.
    pub relaxed: bool,
    pub helmet: HelmetGates,
    pub vest: VestGates,
    pub glove: GloveGates,
    pub boot: BootConfig,
    /// Gloves and boots picked for one person must overlap each other below this IOU.
    pub distinct_iou: f32,
    pub max_matches: usize,
    pub require_two_gloves: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            relaxed: true,
            helmet: HelmetGates::default(),
            vest: VestGates::default(),
            glove: GloveGates::default(),
            boot: BootConfig::default(),
            distinct_iou: 0.5,
            max_matches: 2,
            require_two_gloves: false,
        }
    }
}

/// Streak thresholds for the per-category trackers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    pub helmet_on: u32,
    pub helmet_off: u32,
    pub other_on: u32,
    pub other_off: u32,
    pub track_iou: f32,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            helmet_on: 3,
            helmet_off: 5,
            other_on: 2,
            other_off: 4,
            track_iou: 0.30,
        }
    }
}

impl HysteresisConfig {
    /// `(on, off)` frame counts for `class`.
    pub fn thresholds_for(&self, class: PpeClass) -> (u32, u32) {
        match class {
            PpeClass::Helmet => (self.helmet_on, self.helmet_off),
            _ => (self.other_on, self.other_off),
        }
    }
}

/// Construction-time configuration of a [`crate::engine::PpeEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub confidence: LabelThresholds,
    pub dedup: DedupConfig,
    pub matcher: MatcherConfig,
    pub hysteresis: HysteresisConfig,
    pub label_shift: Option<LabelShiftFix>,
    pub debug_overlay: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence: LabelThresholds::default(),
            dedup: DedupConfig::default(),
            matcher: MatcherConfig::default(),
            hysteresis: HysteresisConfig::default(),
            label_shift: None,
            debug_overlay: true,
        }
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && (0. ..=1.).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be in [0, 1], got {}", name, value))
    }
}

fn check_positive_unit(name: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0. && value <= 1. {
        Ok(())
    } else {
        Err(format!("{} must be in (0, 1], got {}", name, value))
    }
}

fn check_band(name: &str, lo: f32, hi: f32) -> Result<(), String> {
    if lo.is_finite() && hi.is_finite() && lo >= 0. && lo < hi {
        Ok(())
    } else {
        Err(format!("{} band [{}, {}] is empty or inverted", name, lo, hi))
    }
}

fn check_pass(name: &str, gates: &BootPassGates) -> Result<(), String> {
    check_band(&format!("{} area", name), gates.min_area, gates.max_area)?;
    check_band(&format!("{} foot", name), gates.foot_min, gates.foot_max)?;
    check_unit(&format!("{} person IOU", name), gates.min_person_iou)
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).context("failed to parse engine configuration")?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine configuration {}", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn with_label_shift(mut self, fix: LabelShiftFix) -> Self {
        self.label_shift = Some(fix);
        self
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    /// Checks every threshold; the engine refuses to start on the first violation.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.check().map_err(EngineError::InvalidConfig)
    }

    fn check(&self) -> Result<(), String> {
        self.confidence.validate()?;

        check_positive_unit("dedup.nms_iou", self.dedup.nms_iou)?;
        check_positive_unit("dedup.center_eps", self.dedup.center_eps)?;
        check_positive_unit("dedup.center_iou_min", self.dedup.center_iou_min)?;

        let m = &self.matcher;
        check_band("helmet area", m.helmet.min_area, m.helmet.max_area)?;
        check_positive_unit("helmet head fraction", m.helmet.head_frac)?;
        check_unit("helmet person IOU", m.helmet.min_person_iou)?;
        check_band("vest area", m.vest.min_area, m.vest.max_area)?;
        check_unit("vest person IOU", m.vest.min_person_iou)?;
        check_band("glove area", m.glove.min_area, m.glove.max_area)?;
        check_band("glove hand", m.glove.band_min, m.glove.band_max)?;
        check_unit("glove coverage", m.glove.min_coverage)?;
        check_positive_unit("distinct IOU", m.distinct_iou)?;
        if m.max_matches == 0 {
            return Err("max_matches must be at least 1".to_string());
        }
        if m.max_matches < 2 && (m.require_two_gloves || m.boot.require_two_boots) {
            return Err("requiring two gloves or boots needs max_matches >= 2".to_string());
        }

        let b = &m.boot;
        check_unit("boot vest exclusion IOU", b.vest_exclusion_iou)?;
        check_pass("strict boot", &b.strict)?;
        check_band("tight boot foot", b.tight_foot_min, b.tight_foot_max)?;
        check_positive_unit("boot align eps", b.align_eps)?;
        check_positive_unit("tight boot align eps", b.tight_align_eps)?;
        check_positive_unit("frame bottom fraction", b.frame_bottom_frac)?;
        if !(b.small_person_height.is_finite() && b.small_person_height >= 0.) {
            return Err(format!("small person height must be non-negative, got {}", b.small_person_height));
        }
        if !(b.align_widen.is_finite() && b.align_widen >= 1.) {
            return Err(format!("boot align widening must be >= 1, got {}", b.align_widen));
        }
        check_unit("skin reject ratio", b.skin_reject_ratio)?;
        check_unit("dark value max", b.dark_value_max)?;
        check_unit("edge density min", b.edge_density_min)?;
        check_unit("saturation min", b.saturation_min)?;
        check_pass("relaxed boot", &b.relaxed)?;
        check_unit("relaxed skin ratio", b.relaxed_skin_ratio)?;
        check_unit("relaxed edge floor", b.relaxed_edge_floor)?;
        check_band("last resort foot", b.last_resort_foot_min, b.last_resort_foot_max)?;
        check_unit("last resort person IOU", b.last_resort_min_person_iou)?;

        let h = &self.hysteresis;
        for (name, frames) in [
            ("helmet_on", h.helmet_on),
            ("helmet_off", h.helmet_off),
            ("other_on", h.other_on),
            ("other_off", h.other_off),
        ] {
            if frames == 0 {
                return Err(format!("hysteresis {} must be at least 1 frame", name));
            }
        }
        check_positive_unit("hysteresis track IOU", h.track_iou)?;

        if let Some(fix) = &self.label_shift {
            fix.validate()?;
        }
        Ok(())
    }

    /// Multi-line description for startup logs.
    pub fn summary(&self) -> String {
        format!("Confidence (person/helmet/vest/glove/boot): {:.2}/{:.2}/{:.2}/{:.2}/{:.2}\n\
        Person NMS IOU: {:.2} | Center eps: {:.2} | Center IOU: {:.2}\n\
        Relaxed helmet/vest: {}\n\
        Strict boots: {} | Two boots: {} | Two gloves: {} | Boot fallback: {}\n\
        Hysteresis helmet on/off: {}/{} | Other on/off: {}/{} | Track IOU: {:.2}\n\
        Label shift fix: {}\n\
        Debug overlay: {}",
                self.confidence.person, self.confidence.helmet, self.confidence.vest,
                self.confidence.glove, self.confidence.boot,
                self.dedup.nms_iou, self.dedup.center_eps, self.dedup.center_iou_min,
                self.matcher.relaxed,
                self.matcher.boot.strict_boots, self.matcher.boot.require_two_boots,
                self.matcher.require_two_gloves, self.matcher.boot.relax_fallback,
                self.hysteresis.helmet_on, self.hysteresis.helmet_off,
                self.hysteresis.other_on, self.hysteresis.other_off, self.hysteresis.track_iou,
                self.label_shift.as_ref().map(|fix| fix.model_artifact.as_str()).unwrap_or("off"),
                self.debug_overlay)
    }

    /// One-line threshold readout carried in frame diagnostics.
    pub fn hud_text(&self) -> String {
        format!("person_conf:{:.2} helmet_conf:{:.2} vest_conf:{:.2} glove_conf:{:.2} boot_conf:{:.2} \
        nms_iou:{:.2} relax:{} strict_boots:{} two_boots:{} relax_fallback:{}",
                self.confidence.person, self.confidence.helmet, self.confidence.vest,
                self.confidence.glove, self.confidence.boot, self.dedup.nms_iou,
                self.matcher.relaxed, self.matcher.boot.strict_boots,
                self.matcher.boot.require_two_boots, self.matcher.boot.relax_fallback)
    }
}
