mod compliance;
mod engine_config;
mod label_shift;
mod label_threshold;

pub use compliance::*;
pub use engine_config::*;
pub use label_shift::*;
pub use label_threshold::LabelThresholds;
