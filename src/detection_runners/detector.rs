use crate::common::{PpeDetection, PpeFrame, ScoredBox};

/// Person detector collaborator.
///
/// Boxes must be in the input frame's pixel space with confidence in `[0, 1]`.
/// An empty list is a valid answer; an `Err` means the detector itself broke.
pub trait PersonDetector: Send {
    /// Identifier of the loaded model artifact.
    fn model_id(&self) -> &str;

    /// Detects persons in one frame.
    fn detect(&mut self, frame: &PpeFrame) -> anyhow::Result<Vec<ScoredBox>>;
}

/// Protective-equipment detector collaborator.
///
/// Used once for the primary helmet/vest model and optionally once more for a
/// secondary glove/boot model. `class_id`s index into [`PpeDetector::names`].
pub trait PpeDetector: Send {
    /// Identifier of the loaded model artifact.
    fn model_id(&self) -> &str;

    /// Class names of the model, indexed by class id.
    fn names(&self) -> &[String];

    /// Detects equipment in one frame.
    fn detect(&mut self, frame: &PpeFrame) -> anyhow::Result<Vec<PpeDetection>>;
}

impl<T: PersonDetector + ?Sized> PersonDetector for Box<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn detect(&mut self, frame: &PpeFrame) -> anyhow::Result<Vec<ScoredBox>> {
        (**self).detect(frame)
    }
}

impl<T: PpeDetector + ?Sized> PpeDetector for Box<T> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn names(&self) -> &[String] {
        (**self).names()
    }

    fn detect(&mut self, frame: &PpeFrame) -> anyhow::Result<Vec<PpeDetection>> {
        (**self).detect(frame)
    }
}
