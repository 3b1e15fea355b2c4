use regex::Regex;
use crate::common::{PpeBox, PpeClass, PpeDetection};
use crate::data::{LabelShiftFix, LabelThresholds};
use crate::error::EngineError;

/// Candidate boxes per equipment category for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub helmets: Vec<PpeBox>,
    pub vests: Vec<PpeBox>,
    pub gloves: Vec<PpeBox>,
    pub boots: Vec<PpeBox>,
}

impl CandidateSet {
    pub fn get(&self, class: PpeClass) -> &[PpeBox] {
        match class {
            PpeClass::Helmet => &self.helmets,
            PpeClass::Vest => &self.vests,
            PpeClass::Glove => &self.gloves,
            PpeClass::Boot => &self.boots,
            PpeClass::Person => &[],
        }
    }

    fn get_mut(&mut self, class: PpeClass) -> Option<&mut Vec<PpeBox>> {
        match class {
            PpeClass::Helmet => Some(&mut self.helmets),
            PpeClass::Vest => Some(&mut self.vests),
            PpeClass::Glove => Some(&mut self.gloves),
            PpeClass::Boot => Some(&mut self.boots),
            PpeClass::Person => None,
        }
    }
}

/// Maps one model's class ids to canonical classes.
#[derive(Debug, Clone)]
pub struct LabelResolver {
    model_id: String,
    classes: Vec<Option<PpeClass>>,
}

impl LabelResolver {
    /// Builds the class table for a model from its class names, applying `fix` when given.
    pub fn new(model_id: &str, names: &[String], fix: Option<&LabelShiftFix>) -> Result<Self, EngineError> {
        let separators = Regex::new(r"[\s\-]+")
            .map_err(|e| EngineError::InvalidConfig(format!("class name pattern: {}", e)))?;

        let classes = names
            .iter()
            .map(|name| {
                let normalised = separators.replace_all(name.trim(), "_").to_lowercase();
                let class = PpeClass::from_alias(&normalised);
                match fix {
                    Some(fix) => class.and_then(|c| fix.apply(c)),
                    None => class,
                }
            })
            .collect::<Vec<_>>();

        for (id, (name, class)) in names.iter().zip(&classes).enumerate() {
            match class {
                Some(class) => log::debug!("{}: class {} ({}) -> {}", model_id, id, name, class),
                None => log::debug!("{}: class {} ({}) unused", model_id, id, name),
            }
        }

        Ok(Self {
            model_id: model_id.to_string(),
            classes,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Canonical class of a model class id, if any.
    pub fn class_of(&self, class_id: usize) -> Option<PpeClass> {
        self.classes.get(class_id).copied().flatten()
    }

    /// Whether any class id of the model resolves to `class`.
    pub fn resolves(&self, class: PpeClass) -> bool {
        self.classes.iter().any(|c| *c == Some(class))
    }

    /// Sorts detections into per-category candidates, keeping only `wanted` categories
    /// whose confidence clears the category's floor.
    pub fn split(&self, detections: &[PpeDetection], thresholds: &LabelThresholds, wanted: &[PpeClass]) -> CandidateSet {
        let mut set = CandidateSet::default();
        for det in detections {
            if det.class_id >= self.classes.len() {
                log::warn!("{}: class id {} outside the model's {} names", self.model_id, det.class_id, self.classes.len());
                continue;
            }
            let Some(class) = self.class_of(det.class_id) else {
                continue;
            };
            if !wanted.contains(&class) || !thresholds.check_conf(class, det.confidence) {
                continue;
            }
            if let Some(boxes) = set.get_mut(class) {
                boxes.push(det.bbox);
            }
        }
        set
    }
}
