//! Layer rule configuration for surface classification.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Height and slope band that selects one surface layer.
///
/// Heights are in grid units, slopes in degrees. The height band is widened
/// on both sides by `blend_offset` plus a noise term so neighboring layers
/// interleave instead of meeting on a straight contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerRule {
    /// Host-facing label (texture, prototype or detail name).
    pub name: String,
    pub height_min: f32,
    pub height_max: f32,
    pub slope_min: f32,
    pub slope_max: f32,
    pub noise_x_scale: f32,
    pub noise_y_scale: f32,
    /// Gain on the blend noise.
    pub noise_amplitude: f32,
    pub blend_offset: f32,
}

impl Default for LayerRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            height_min: 0.1,
            height_max: 0.2,
            slope_min: 0.0,
            slope_max: 1.5,
            noise_x_scale: 0.01,
            noise_y_scale: 0.01,
            noise_amplitude: 0.1,
            blend_offset: 0.1,
        }
    }
}

impl LayerRule {
    pub fn validate(&self) -> TerrainResult<()> {
        let fields = [
            ("height_min", self.height_min),
            ("height_max", self.height_max),
            ("slope_min", self.slope_min),
            ("slope_max", self.slope_max),
            ("noise_x_scale", self.noise_x_scale),
            ("noise_y_scale", self.noise_y_scale),
            ("noise_amplitude", self.noise_amplitude),
            ("blend_offset", self.blend_offset),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(TerrainError::invalid(name, format!("must be finite, got {value}")));
            }
        }
        Ok(())
    }
}

/// What to do with a cell no rule matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Leave its weight vector all zero.
    #[default]
    Zero,
    /// Fail with `DegenerateNormalization`.
    Reject,
}
