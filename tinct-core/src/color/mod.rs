//! Accent extraction and palette synthesis.

pub mod sampler;
pub mod synth;

pub use sampler::{PixelView, sample};
pub use synth::{safe_accent, synthesize};
