
mod ppe_box;
mod ppe_class;
mod ppe_detection;
mod ppe_frame;

pub use ppe_box::*;
pub use ppe_class::*;
pub use ppe_detection::*;
pub use ppe_frame::*;
