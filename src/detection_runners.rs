pub mod detector;
pub mod nms;

pub use detector::*;
pub use nms::{dedup_by_center, dedup_persons, nms, Nms};
