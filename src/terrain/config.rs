//! Parameters for the height synthesizers.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use super::Grid;

/// Whether a synthesizer starts from a zero grid or from the current heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulateMode {
    /// Replace the current heights.
    #[default]
    Overwrite,
    /// Add onto the current heights.
    Accumulate,
}

impl AccumulateMode {
    /// Writes `value` into `cell`, replacing or adding per mode.
    #[inline]
    pub fn apply(self, cell: &mut f32, value: f32) {
        match self {
            AccumulateMode::Overwrite => *cell = value,
            AccumulateMode::Accumulate => *cell += value,
        }
    }

    /// The heights an operator should start from: zeros or a copy of `grid`.
    pub fn starting_grid(self, grid: &Grid) -> Grid {
        let mut start = grid.clone();
        if self == AccumulateMode::Overwrite {
            start.fill(0.0);
        }
        start
    }
}

/// Falloff profile of a Voronoi peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoronoiVariant {
    #[default]
    Linear,
    Power,
    Combined,
    PowerSin,
}

/// Parameters for Voronoi peak tessellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiParams {
    /// Number of candidate peaks to place.
    pub peak_count: usize,
    /// Slope multiplier on normalized distance.
    pub falloff: f32,
    /// Exponent (or divisor for `PowerSin`) shaping the falloff curve.
    pub drop_off: f32,
    /// Lowest peak height.
    pub min_height: f32,
    /// Highest peak height.
    pub max_height: f32,
    pub variant: VoronoiVariant,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self {
            peak_count: 5,
            falloff: 0.2,
            drop_off: 0.6,
            min_height: 0.1,
            max_height: 0.5,
            variant: VoronoiVariant::Linear,
        }
    }
}

impl VoronoiParams {
    pub fn validate(&self) -> TerrainResult<()> {
        for (name, value) in [
            ("falloff", self.falloff),
            ("drop_off", self.drop_off),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
        ] {
            if !value.is_finite() {
                return Err(TerrainError::invalid(name, format!("must be finite, got {value}")));
            }
        }
        if self.min_height > self.max_height {
            return Err(TerrainError::invalid(
                "min_height",
                format!("{} exceeds max_height {}", self.min_height, self.max_height),
            ));
        }
        if self.variant == VoronoiVariant::PowerSin && self.drop_off == 0.0 {
            return Err(TerrainError::invalid("drop_off", "divides the sine term and must be non-zero"));
        }
        Ok(())
    }
}

/// Parameters for diamond-square midpoint displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidpointParams {
    /// Lower bound of the first level's random offset.
    pub height_min: f32,
    /// Upper bound of the first level's random offset.
    pub height_max: f32,
    /// Base of the per-level decay `dampener_power^-roughness`.
    pub dampener_power: f32,
    pub roughness: f32,
}

impl Default for MidpointParams {
    fn default() -> Self {
        Self {
            height_min: -2.0,
            height_max: 2.0,
            dampener_power: 2.0,
            roughness: 2.0,
        }
    }
}

impl MidpointParams {
    pub fn validate(&self) -> TerrainResult<()> {
        if self.height_min > self.height_max {
            return Err(TerrainError::invalid(
                "height_min",
                format!("{} exceeds height_max {}", self.height_min, self.height_max),
            ));
        }
        let decay = self.decay();
        if !decay.is_finite() {
            return Err(TerrainError::invalid(
                "dampener_power",
                format!(
                    "{}^-{} is not a finite decay factor",
                    self.dampener_power, self.roughness
                ),
            ));
        }
        Ok(())
    }

    /// Amplitude multiplier applied after each level.
    pub fn decay(&self) -> f32 {
        self.dampener_power.powf(-self.roughness)
    }
}
