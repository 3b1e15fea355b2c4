//! Per-category debouncing of the frame-wide "matched boxes" signal.

use crate::common::{PpeBox, PpeClass};
use crate::data::HysteresisConfig;
use crate::error::EngineError;

/// Cross-frame state of one category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassHysteresisState {
    pub is_present: bool,
    pub on_streak: u32,
    pub off_streak: u32,
    pub previous_boxes: Vec<PpeBox>,
}

/// Schmitt trigger over per-frame presence.
///
/// Flips to present only once `on_streak >= on_threshold` and back to absent only once
/// `off_streak >= off_threshold`. A frame of the opposite kind resets the streak.
#[derive(Debug, Clone)]
pub struct HysteresisTracker {
    class: PpeClass,
    on_threshold: u32,
    off_threshold: u32,
    track_iou: f32,
    state: ClassHysteresisState,
}

impl HysteresisTracker {
    pub fn new(class: PpeClass, on_threshold: u32, off_threshold: u32, track_iou: f32) -> Result<Self, EngineError> {
        if on_threshold == 0 || off_threshold == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "{} tracker needs on/off thresholds of at least 1, got {}/{}",
                class, on_threshold, off_threshold
            )));
        }
        if !(track_iou > 0. && track_iou <= 1.) {
            return Err(EngineError::InvalidConfig(format!("{} tracker IOU must be in (0, 1], got {}", class, track_iou)));
        }
        Ok(Self {
            class,
            on_threshold,
            off_threshold,
            track_iou,
            state: ClassHysteresisState::default(),
        })
    }

    pub fn from_config(class: PpeClass, config: &HysteresisConfig) -> Result<Self, EngineError> {
        let (on, off) = config.thresholds_for(class);
        Self::new(class, on, off, config.track_iou)
    }

    pub fn class(&self) -> PpeClass {
        self.class
    }

    pub fn is_present(&self) -> bool {
        self.state.is_present
    }

    pub fn state(&self) -> &ClassHysteresisState {
        &self.state
    }

    /// Whether any box this frame overlaps a box from the previous frame enough to be the same item.
    fn linked(&self, boxes: &[PpeBox]) -> bool {
        boxes.iter().any(|b| {
            self.state.previous_boxes.iter().any(|pb| b.iou(pb) >= self.track_iou)
        })
    }

    /// Feeds one frame's matched boxes and returns the debounced presence.
    pub fn update(&mut self, boxes: &[PpeBox]) -> bool {
        let linked = self.linked(boxes);
        let present_now = !boxes.is_empty() || (linked && self.state.is_present);

        let state = &mut self.state;
        if present_now {
            state.on_streak = state.on_streak.saturating_add(1);
            state.off_streak = 0;
            if !state.is_present && state.on_streak >= self.on_threshold {
                state.is_present = true;
                log::debug!("{} present after {} frames", self.class, state.on_streak);
            }
        } else {
            state.off_streak = state.off_streak.saturating_add(1);
            state.on_streak = 0;
            if state.is_present && state.off_streak >= self.off_threshold {
                state.is_present = false;
                log::debug!("{} absent after {} frames", self.class, state.off_streak);
            }
        }

        state.previous_boxes = boxes.to_vec();
        state.is_present
    }

    pub fn reset(&mut self) {
        self.state = ClassHysteresisState::default();
    }
}

/// The four category trackers owned by one engine.
#[derive(Debug, Clone)]
pub struct ComplianceTrackers {
    pub helmet: HysteresisTracker,
    pub vest: HysteresisTracker,
    pub glove: HysteresisTracker,
    pub boot: HysteresisTracker,
}

impl ComplianceTrackers {
    pub fn new(config: &HysteresisConfig) -> Result<Self, EngineError> {
        Ok(Self {
            helmet: HysteresisTracker::from_config(PpeClass::Helmet, config)?,
            vest: HysteresisTracker::from_config(PpeClass::Vest, config)?,
            glove: HysteresisTracker::from_config(PpeClass::Glove, config)?,
            boot: HysteresisTracker::from_config(PpeClass::Boot, config)?,
        })
    }

    pub fn get(&self, class: PpeClass) -> Option<&HysteresisTracker> {
        match class {
            PpeClass::Helmet => Some(&self.helmet),
            PpeClass::Vest => Some(&self.vest),
            PpeClass::Glove => Some(&self.glove),
            PpeClass::Boot => Some(&self.boot),
            PpeClass::Person => None,
        }
    }

    pub fn update(&mut self, class: PpeClass, boxes: &[PpeBox]) -> bool {
        match class {
            PpeClass::Helmet => self.helmet.update(boxes),
            PpeClass::Vest => self.vest.update(boxes),
            PpeClass::Glove => self.glove.update(boxes),
            PpeClass::Boot => self.boot.update(boxes),
            PpeClass::Person => false,
        }
    }

    pub fn reset(&mut self) {
        self.helmet.reset();
        self.vest.reset();
        self.glove.reset();
        self.boot.reset();
    }
}
