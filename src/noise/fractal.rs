//! Perlin-type 2D noise and fractal Brownian motion (fBm) summation.

use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use crate::error::{TerrainError, TerrainResult};

/// Upper bound on octaves; past this the amplitude sum overflows for large persistence.
pub const MAX_OCTAVES: u32 = 24;

/// Seed used by [`NoiseField::default`], shared by every synthesizer and the classifier.
pub const DEFAULT_NOISE_SEED: i32 = 1337;

/// Peak magnitude of one unscaled simdnoise simplex octave at frequency 1.
const SIMPLEX_AMPLITUDE: f32 = 0.0221;

/// A deterministic, continuous 2D gradient-noise field with values in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseField {
    /// Seed selecting the gradient lattice.
    pub seed: i32,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self {
            seed: DEFAULT_NOISE_SEED,
        }
    }
}

impl NoiseField {
    /// Creates a noise field with the given seed.
    pub fn new(seed: i32) -> Self {
        Self { seed }
    }

    /// Samples the field at `(x, y)`.
    ///
    /// The same input always yields the same output; the result is clamped to `[0, 1]`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        // simdnoise leaves a single octave unscaled, around +-0.022
        let raw = NoiseBuilder::fbm_2d_offset(x, 1, y, 1)
            .with_seed(self.seed)
            .with_freq(1.0)
            .with_octaves(1)
            .generate()
            .0[0];

        (raw / SIMPLEX_AMPLITUDE * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Sums `octaves` layers of [`sample`](Self::sample), doubling frequency and
    /// scaling amplitude by `persistence` each octave, normalized by the
    /// amplitude total so the result stays in `[0, 1]`.
    ///
    /// # Errors
    /// `InvalidParameter` when `octaves` is 0 or above [`MAX_OCTAVES`], or when
    /// `persistence` is negative or not finite.
    pub fn fbm(&self, x: f32, y: f32, octaves: u32, persistence: f32) -> TerrainResult<f32> {
        validate_octaves(octaves, persistence)?;
        Ok(self.fractal_sum(x, y, octaves, persistence))
    }

    /// Unchecked fBm; callers validate `octaves`/`persistence` once up front.
    pub(crate) fn fractal_sum(&self, x: f32, y: f32, octaves: u32, persistence: f32) -> f32 {
        let mut total = 0.0f32;
        let mut frequency = 1.0f32;
        let mut amplitude = 1.0f32;
        let mut max_amplitude = 0.0f32;

        for _ in 0..octaves {
            total += self.sample(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= 2.0;
        }

        total / max_amplitude
    }
}

fn validate_octaves(octaves: u32, persistence: f32) -> TerrainResult<()> {
    if octaves == 0 || octaves > MAX_OCTAVES {
        return Err(TerrainError::invalid(
            "octaves",
            format!("must be in 1..={MAX_OCTAVES}, got {octaves}"),
        ));
    }
    if !persistence.is_finite() || persistence < 0.0 {
        return Err(TerrainError::invalid(
            "persistence",
            format!("must be finite and non-negative, got {persistence}"),
        ));
    }
    Ok(())
}

/// Parameters for one fBm height layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Horizontal frequency scale applied to cell x.
    pub x_scale: f32,
    /// Horizontal frequency scale applied to cell y.
    pub y_scale: f32,
    /// Number of fBm octaves (>= 1).
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f32,
    /// Multiplier applied to the normalized fBm value.
    pub height_scale: f32,
    /// Offset added to cell x before scaling.
    pub offset_x: f32,
    /// Offset added to cell y before scaling.
    pub offset_y: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            x_scale: 0.01,
            y_scale: 0.01,
            octaves: 3,
            persistence: 8.0,
            height_scale: 0.09,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl NoiseParams {
    /// Checks octave count, persistence and that every scale is finite.
    pub fn validate(&self) -> TerrainResult<()> {
        validate_octaves(self.octaves, self.persistence)?;
        for (name, value) in [
            ("x_scale", self.x_scale),
            ("y_scale", self.y_scale),
            ("height_scale", self.height_scale),
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
        ] {
            if !value.is_finite() {
                return Err(TerrainError::invalid(name, format!("must be finite, got {value}")));
            }
        }
        Ok(())
    }

    /// Scaled fBm height for grid cell `(x, y)`.
    #[inline]
    pub(crate) fn height_at(&self, field: &NoiseField, x: f32, y: f32) -> f32 {
        field.fractal_sum(
            (x + self.offset_x) * self.x_scale,
            (y + self.offset_y) * self.y_scale,
            self.octaves,
            self.persistence,
        ) * self.height_scale
    }
}

/// Linearly maps `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`.
///
/// A degenerate source range maps everything to `to_lo`.
pub fn remap(value: f32, from_lo: f32, from_hi: f32, to_lo: f32, to_hi: f32) -> f32 {
    let span = from_hi - from_lo;
    if span == 0.0 {
        return to_lo;
    }
    (value - from_lo) * (to_hi - to_lo) / span + to_lo
}
