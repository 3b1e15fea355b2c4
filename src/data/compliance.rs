use serde::Serialize;
use crate::common::{PpeBox, PpeClass};
use crate::matching::BootPass;

/// Per-person verdict for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplianceOutcome {
    pub helmet_ok: bool,
    pub vest_ok: bool,
    pub glove_ok: bool,
    pub boot_ok: bool,
    pub helmet: Option<PpeBox>,
    pub vest: Option<PpeBox>,
    /// Up to two mutually distinct glove boxes.
    pub gloves: Vec<PpeBox>,
    /// Up to two mutually distinct boot boxes.
    pub boots: Vec<PpeBox>,
}

impl ComplianceOutcome {
    pub fn is_fully_compliant(&self) -> bool {
        self.helmet_ok && self.vest_ok && self.glove_ok && self.boot_ok
    }

    pub fn is_ok(&self, class: PpeClass) -> bool {
        match class {
            PpeClass::Helmet => self.helmet_ok,
            PpeClass::Vest => self.vest_ok,
            PpeClass::Glove => self.glove_ok,
            PpeClass::Boot => self.boot_ok,
            PpeClass::Person => true,
        }
    }

    /// Matched boxes of one category.
    pub fn boxes(&self, class: PpeClass) -> Vec<PpeBox> {
        match class {
            PpeClass::Helmet => self.helmet.into_iter().collect(),
            PpeClass::Vest => self.vest.into_iter().collect(),
            PpeClass::Glove => self.gloves.clone(),
            PpeClass::Boot => self.boots.clone(),
            PpeClass::Person => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonReport {
    pub person: PpeBox,
    pub confidence: f32,
    pub outcome: ComplianceOutcome,
    /// Boot pass that produced the boot match, if any.
    pub boot_pass: Option<BootPass>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameDiagnostics {
    /// Persons left after de-duplication.
    pub person_count: usize,
    pub helmet_candidates: usize,
    pub vest_candidates: usize,
    pub glove_candidates: usize,
    pub boot_candidates: usize,
    pub relaxed: bool,
    pub label_shift: bool,
    pub persons: Vec<PersonReport>,
    pub hud: String,
}

impl FrameDiagnostics {
    pub fn counts_text(&self) -> String {
        format!("P:{} H:{} V:{} G:{} B:{} | RELAX:{} | FIX:{}",
                self.person_count, self.helmet_candidates, self.vest_candidates,
                self.glove_candidates, self.boot_candidates, self.relaxed, self.label_shift)
    }

    pub fn hud_text(&self) -> &str {
        &self.hud
    }
}

/// Aggregate verdict of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameResult {
    /// Debounced presence, false whenever the frame has no person.
    pub any_helmet: bool,
    pub any_vest: bool,
    pub any_gloves: bool,
    pub any_boots: bool,
    /// Some person in this frame matched all four categories (not debounced).
    pub any_person_fully_compliant: bool,
    pub diagnostics: FrameDiagnostics,
}

impl FrameResult {
    pub fn is_present(&self, class: PpeClass) -> bool {
        match class {
            PpeClass::Helmet => self.any_helmet,
            PpeClass::Vest => self.any_vest,
            PpeClass::Glove => self.any_gloves,
            PpeClass::Boot => self.any_boots,
            PpeClass::Person => self.diagnostics.person_count > 0,
        }
    }

    /// Names what is missing, e.g. `"gloves_boots_missing"`; `None` when nothing is
    /// missing or nobody is in view.
    pub fn violation_code(&self) -> Option<String> {
        if self.diagnostics.person_count == 0 {
            return None;
        }
        let missing: Vec<&str> = PpeClass::EQUIPMENT
            .iter()
            .filter(|class| !self.is_present(**class))
            .map(|class| class.report_name())
            .collect();
        if missing.is_empty() {
            return None;
        }
        if missing == ["helmet", "vest"] {
            return Some("helmet_and_vest_missing".to_string());
        }
        Some(format!("{}_missing", missing.join("_")))
    }
}
