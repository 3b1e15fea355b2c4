use serde::{Deserialize, Serialize};
use crate::common::PpeClass;

/// Per-category confidence floors applied to detector output before matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub person: f32,
    pub helmet: f32,
    pub vest: f32,
    pub glove: f32,
    pub boot: f32,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            person: 0.25,
            helmet: 0.55,
            vest: 0.55,
            glove: 0.35,
            boot: 0.35,
        }
    }
}

impl LabelThresholds {
    pub fn get(&self, class: PpeClass) -> f32 {
        match class {
            PpeClass::Person => self.person,
            PpeClass::Helmet => self.helmet,
            PpeClass::Vest => self.vest,
            PpeClass::Glove => self.glove,
            PpeClass::Boot => self.boot,
        }
    }

    pub fn check_conf(&self, class: PpeClass, conf: f32) -> bool {
        conf >= self.get(class)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        for class in [PpeClass::Person, PpeClass::Helmet, PpeClass::Vest, PpeClass::Glove, PpeClass::Boot] {
            let threshold = self.get(class);
            if !(threshold > 0. && threshold <= 1.) {
                return Err(format!("{} confidence threshold must be in (0, 1], got {}", class, threshold));
            }
        }
        Ok(())
    }
}
