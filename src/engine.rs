use std::time::Instant;
use crate::annotate::annotate_person;
use crate::common::{PpeBox, PpeClass, PpeFrame};
use crate::data::{EngineConfig, FrameDiagnostics, FrameResult, PersonReport};
use crate::detection_runners::{dedup_persons, PersonDetector, PpeDetector};
use crate::error::{DetectorRole, EngineError};
use crate::hysteresis::ComplianceTrackers;
use crate::label_resolver::{CandidateSet, LabelResolver};
use crate::matching::match_person;
use crate::utils;

const PRIMARY_CLASSES: [PpeClass; 2] = [PpeClass::Helmet, PpeClass::Vest];
const SECONDARY_CLASSES: [PpeClass; 2] = [PpeClass::Glove, PpeClass::Boot];

struct PpeModel {
    detector: Box<dyn PpeDetector>,
    labels: LabelResolver,
}

/// Per-camera compliance engine.
///
/// Owns the detectors and the four hysteresis trackers; frames sent to one engine must be
/// processed one at a time, separate engines share nothing.
pub struct PpeEngine {
    config: EngineConfig,
    person_detector: Box<dyn PersonDetector>,
    primary: PpeModel,
    secondary: Option<PpeModel>,
    trackers: ComplianceTrackers,
    hud: String,
}

fn check_confidence(role: DetectorRole, confidence: f32) -> Result<(), EngineError> {
    if confidence.is_finite() && (0. ..=1.).contains(&confidence) {
        Ok(())
    } else {
        Err(EngineError::InvalidDetection {
            role,
            reason: format!("confidence {} outside [0, 1]", confidence),
        })
    }
}

impl PpeEngine {
    /// Validates `config` and the detectors, then builds an engine with absent trackers.
    ///
    /// Without a `secondary` detector gloves and boots can never be reported present.
    pub fn new(
        config: EngineConfig,
        person_detector: Box<dyn PersonDetector>,
        primary: Box<dyn PpeDetector>,
        secondary: Option<Box<dyn PpeDetector>>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        if let Some(fix) = &config.label_shift {
            if !fix.applies_to(primary.model_id()) {
                return Err(EngineError::InvalidConfig(format!(
                    "label shift fix targets model '{}' but the primary detector runs '{}'",
                    fix.model_artifact,
                    primary.model_id()
                )));
            }
        }

        let primary_labels = LabelResolver::new(primary.model_id(), primary.names(), config.label_shift.as_ref())?;
        if !PRIMARY_CLASSES.iter().any(|c| primary_labels.resolves(*c)) {
            return Err(EngineError::InvalidConfig(format!(
                "primary detector '{}' has no helmet or vest class", primary.model_id()
            )));
        }

        let secondary = match secondary {
            Some(detector) => {
                let labels = LabelResolver::new(detector.model_id(), detector.names(), None)?;
                if !SECONDARY_CLASSES.iter().any(|c| labels.resolves(*c)) {
                    return Err(EngineError::InvalidConfig(format!(
                        "secondary detector '{}' has no glove or boot class", detector.model_id()
                    )));
                }
                Some(PpeModel { detector, labels })
            }
            None => {
                log::info!("No secondary detector, gloves and boots will report absent");
                None
            }
        };

        let trackers = ComplianceTrackers::new(&config.hysteresis)?;
        log::info!("Initializing PPE engine (person: {}, primary: {}, secondary: {})\n{}",
                   person_detector.model_id(),
                   primary.model_id(),
                   secondary.as_ref().map(|m| m.detector.model_id()).unwrap_or("none"),
                   config.summary());

        Ok(Self {
            hud: config.hud_text(),
            config,
            person_detector,
            primary: PpeModel { detector: primary, labels: primary_labels },
            secondary,
            trackers,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn trackers(&self) -> &ComplianceTrackers {
        &self.trackers
    }

    /// Returns every tracker to absent with empty streaks.
    pub fn reset_trackers(&mut self) {
        self.trackers.reset();
    }

    /// Processes one frame and returns an annotated copy with the verdict.
    ///
    /// The copy is only drawn on when `debug_overlay` is enabled.
    pub fn process(&mut self, frame: &PpeFrame) -> Result<(PpeFrame, FrameResult), EngineError> {
        let result = self.evaluate(frame)?;
        let mut annotated = frame.clone();
        self.annotate(&mut annotated, &result);
        Ok((annotated, result))
    }

    /// Processes one frame, drawing the overlay straight onto it.
    pub fn process_in_place(&mut self, frame: &mut PpeFrame) -> Result<FrameResult, EngineError> {
        let result = self.evaluate(frame)?;
        self.annotate(frame, &result);
        Ok(result)
    }

    fn annotate(&self, frame: &mut PpeFrame, result: &FrameResult) {
        if !self.config.debug_overlay {
            return;
        }
        for report in &result.diagnostics.persons {
            annotate_person(&mut frame.image, report);
        }
    }

    fn detect_ppe(model: &mut PpeModel, role: DetectorRole, frame: &PpeFrame, config: &EngineConfig, wanted: &[PpeClass]) -> Result<CandidateSet, EngineError> {
        let detections = model.detector
            .detect(frame)
            .map_err(|source| EngineError::Detector { role, source })?;
        for det in &detections {
            check_confidence(role, det.confidence)?;
        }
        Ok(model.labels.split(&detections, &config.confidence, wanted))
    }

    fn evaluate(&mut self, frame: &PpeFrame) -> Result<FrameResult, EngineError> {
        frame.validate()?;
        let (width, height) = frame.dimensions();
        let start = Instant::now();
        let mut elapsed = start.elapsed();

        let raw_persons = self.person_detector
            .detect(frame)
            .map_err(|source| EngineError::Detector { role: DetectorRole::Person, source })?;
        for p in &raw_persons {
            check_confidence(DetectorRole::Person, p.confidence)?;
        }
        let persons: Vec<_> = raw_persons
            .into_iter()
            .filter(|p| self.config.confidence.check_conf(PpeClass::Person, p.confidence))
            .collect();
        let persons = dedup_persons(&persons, &self.config.dedup, width, height);
        elapsed = utils::trace("TIME", "Person detection", start, elapsed);

        let mut candidates = Self::detect_ppe(&mut self.primary, DetectorRole::PrimaryPpe, frame, &self.config, &PRIMARY_CLASSES)?;
        if let Some(secondary) = self.secondary.as_mut() {
            let extra = Self::detect_ppe(secondary, DetectorRole::SecondaryPpe, frame, &self.config, &SECONDARY_CLASSES)?;
            candidates.gloves = extra.gloves;
            candidates.boots = extra.boots;
        }
        elapsed = utils::trace("TIME", "PPE detection", start, elapsed);

        let mut matched: [Vec<PpeBox>; 4] = Default::default();
        let mut reports = Vec::with_capacity(persons.len());
        for person in &persons {
            let found = match_person(&person.bbox, &candidates, Some(&frame.image), &self.config.matcher);
            for (slot, class) in matched.iter_mut().zip(PpeClass::EQUIPMENT) {
                slot.extend(found.outcome.boxes(class));
            }
            reports.push(PersonReport {
                person: person.bbox,
                confidence: person.confidence,
                outcome: found.outcome,
                boot_pass: found.boot_pass,
            });
        }
        let any_person_fully_compliant = reports.iter().any(|r| r.outcome.is_fully_compliant());
        elapsed = utils::trace("TIME", "Matching", start, elapsed);

        let mut present = [false; 4];
        for ((flag, boxes), class) in present.iter_mut().zip(&matched).zip(PpeClass::EQUIPMENT) {
            *flag = self.trackers.update(class, boxes);
        }
        utils::trace("TIME", "Hysteresis", start, elapsed);

        let has_persons = !persons.is_empty();
        let diagnostics = FrameDiagnostics {
            person_count: persons.len(),
            helmet_candidates: candidates.helmets.len(),
            vest_candidates: candidates.vests.len(),
            glove_candidates: candidates.gloves.len(),
            boot_candidates: candidates.boots.len(),
            relaxed: self.config.matcher.relaxed,
            label_shift: self.config.label_shift.is_some(),
            persons: reports,
            hud: self.hud.clone(),
        };
        log::debug!("{}", diagnostics.counts_text());

        Ok(FrameResult {
            any_helmet: has_persons && present[0],
            any_vest: has_persons && present[1],
            any_gloves: has_persons && present[2],
            any_boots: has_persons && present[3],
            any_person_fully_compliant,
            diagnostics,
        })
    }
}
