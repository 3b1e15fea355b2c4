use serde::{Deserialize, Serialize};
use crate::common::PpeClass;

/// Rewrites one resolved class to another, or drops it when `to` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRemap {
    pub from: PpeClass,
    pub to: Option<PpeClass>,
}

/// Class remapping that compensates for a mislabelled model artifact.
///
/// The fix is bound to a single model through `model_artifact`; the engine refuses to
/// start when the primary detector reports a different model id. Re-check the table
/// whenever that model is retrained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelShiftFix {
    pub model_artifact: String,
    pub remaps: Vec<ClassRemap>,
}

impl LabelShiftFix {
    /// The shift observed in the helmet/vest model: its "vest" output is a helmet,
    /// its "boot" output is a vest, and its own "helmet" output is unusable.
    pub fn helmet_vest_shift(model_artifact: &str) -> Self {
        Self {
            model_artifact: model_artifact.to_string(),
            remaps: vec![
                ClassRemap { from: PpeClass::Helmet, to: None },
                ClassRemap { from: PpeClass::Vest, to: Some(PpeClass::Helmet) },
                ClassRemap { from: PpeClass::Boot, to: Some(PpeClass::Vest) },
            ],
        }
    }

    /// Applies the remap table; classes without an entry pass through unchanged.
    pub fn apply(&self, class: PpeClass) -> Option<PpeClass> {
        match self.remaps.iter().find(|remap| remap.from == class) {
            Some(remap) => remap.to,
            None => Some(class),
        }
    }

    pub fn applies_to(&self, model_id: &str) -> bool {
        self.model_artifact == model_id
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.model_artifact.trim().is_empty() {
            return Err("label shift fix must name the model artifact it compensates".to_string());
        }
        for (i, remap) in self.remaps.iter().enumerate() {
            if self.remaps[..i].iter().any(|earlier| earlier.from == remap.from) {
                return Err(format!("label shift fix remaps {} more than once", remap.from));
            }
        }
        Ok(())
    }
}
