use serde::{Deserialize, Serialize};
use crate::common::PpeBox;
use crate::detection_runners::nms::Nms;

/// One raw detector output: model class index, box and confidence.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct PpeDetection {
    pub class_id: usize,
    pub bbox: PpeBox,
    pub label: Option<String>,
    pub confidence: f32,
}

impl Nms for PpeDetection {
    fn bbox(&self) -> &PpeBox {
        &self.bbox
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl PpeDetection {
    pub fn new(class_id: usize, bbox: PpeBox, confidence: f32) -> Self {
        Self {
            class_id,
            bbox,
            label: None,
            confidence,
        }
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = PpeBox::default().with_cxcy_wh(cx, cy, w, h);
        self
    }

    /// Sets the confidence score of the detection.
    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.confidence = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: usize) -> Self {
        self.class_id = class_id;
        self
    }

    /// Sets the optional name of the detection.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn get_label(&self) -> String {
        self.label.clone().unwrap_or("Unknown".to_string())
    }
}

/// A person box with its detector confidence.
#[derive(Default, Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ScoredBox {
    pub bbox: PpeBox,
    pub confidence: f32,
}

impl ScoredBox {
    pub fn new(bbox: PpeBox, confidence: f32) -> Self {
        Self { bbox, confidence }
    }
}

impl Nms for ScoredBox {
    fn bbox(&self) -> &PpeBox {
        &self.bbox
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }
}
