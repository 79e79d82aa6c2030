//! Per-image processing stages: fixed-shape masks, autocrop, and the
//! pipeline composing them.
pub mod autocrop;
pub mod mask;
pub mod pipeline;

pub use autocrop::{autocrop, find_crop_rect};
pub use mask::Mask;
pub use pipeline::Pipeline;
