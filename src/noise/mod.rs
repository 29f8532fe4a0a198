//! Noise generation for terrain synthesis.
//!
//! Single samples come from simdnoise; octave summation and normalization
//! happen here so fBm output stays in `[0, 1]`.

mod fractal;
mod texture;

pub use fractal::{remap, NoiseField, NoiseParams, DEFAULT_NOISE_SEED, MAX_OCTAVES};
pub use texture::{noise_texture, TextureOptions};
