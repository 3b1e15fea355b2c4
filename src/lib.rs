mod utils;
pub mod annotate;
pub mod appearance;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod engine;
pub mod error;
pub mod hysteresis;
pub mod label_resolver;
pub mod matching;

use std::time::Instant;
use anyhow::Context;
use crate::common::PpeFrame;
use crate::data::{EngineConfig, FrameResult};
use crate::detection_runners::{PersonDetector, PpeDetector};

pub use crate::engine::PpeEngine;
pub use crate::error::{DetectorRole, EngineError};

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Builds an engine for one camera stream.
pub fn init_engine(
    config: EngineConfig,
    person: Box<dyn PersonDetector>,
    primary: Box<dyn PpeDetector>,
    secondary: Option<Box<dyn PpeDetector>>,
) -> anyhow::Result<PpeEngine> {
    log::info!("===========\ninit_engine\n===========");
    let engine = PpeEngine::new(config, person, primary, secondary)
        .context("Failed to initialize PPE engine")?;
    Ok(engine)
}

pub fn run_compliance(engine: &mut PpeEngine, frame: &PpeFrame) -> anyhow::Result<(PpeFrame, FrameResult)> {
    let now = Instant::now();

    let (annotated, result) = engine.process(frame)?;

    log::debug!("Processing time: {:?}", now.elapsed());
    if let Some(code) = result.violation_code() {
        log::info!("Violation: {}", code);
    }

    Ok((annotated, result))
}
