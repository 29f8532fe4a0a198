//! Erosion configuration.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};

/// Shared knobs for every erosion kind.
///
/// Not every kind reads every field: `amount` is thermal only, `droplet_count`
/// is read by rain and river, `springs_per_droplet` and `solubility` by river.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Height removed per rain droplet, talus threshold for thermal, starting
    /// erosion value for river springs, noise gain for wind.
    pub strength: f32,
    /// Fraction of a cell's height moved per thermal transfer.
    pub amount: f32,
    pub droplet_count: u32,
    pub springs_per_droplet: u32,
    /// Erosion value lost per river step.
    pub solubility: f32,
    /// Smoothing passes run after the erosion kind finishes.
    pub smooth_passes_after: u32,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            strength: 0.1,
            amount: 0.01,
            droplet_count: 10,
            springs_per_droplet: 5,
            solubility: 0.01,
            smooth_passes_after: 5,
        }
    }
}

impl ErosionParams {
    pub fn validate(&self) -> TerrainResult<()> {
        if !self.strength.is_finite() {
            return Err(TerrainError::invalid("strength", "must be finite"));
        }
        if !self.amount.is_finite() {
            return Err(TerrainError::invalid("amount", "must be finite"));
        }
        if !self.solubility.is_finite() {
            return Err(TerrainError::invalid("solubility", "must be finite"));
        }
        Ok(())
    }
}

/// Parameters for canyon carving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanyonParams {
    /// How far below the entry cell the canyon floor starts.
    pub dig_depth: f32,
    /// Minimum depth gained per step away from the channel; up to 0.01 of
    /// jitter is added on top.
    pub bank_slope: f32,
    /// Carving never reaches this height or below.
    pub floor: f32,
    /// Visit `(0, 1)` once instead of twice per carved cell.
    pub collapse_duplicate_direction: bool,
}

impl Default for CanyonParams {
    fn default() -> Self {
        Self {
            dig_depth: 0.05,
            bank_slope: 0.001,
            floor: 0.0,
            collapse_duplicate_direction: false,
        }
    }
}

impl CanyonParams {
    pub fn validate(&self) -> TerrainResult<()> {
        if !self.dig_depth.is_finite() {
            return Err(TerrainError::invalid("dig_depth", "must be finite"));
        }
        if !(self.bank_slope > 0.0) || !self.bank_slope.is_finite() {
            return Err(TerrainError::invalid(
                "bank_slope",
                format!("must be a positive finite value, got {}", self.bank_slope),
            ));
        }
        if !self.floor.is_finite() {
            return Err(TerrainError::invalid("floor", "must be finite"));
        }
        Ok(())
    }
}

/// Which erosion simulator [`erode`](super::erode) runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErosionKind {
    Rain,
    #[default]
    Thermal,
    Tidal { water_height: f32 },
    River,
    Wind { direction_deg: f32 },
    Canyon(CanyonParams),
}

impl ErosionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErosionKind::Rain => "rain",
            ErosionKind::Thermal => "thermal",
            ErosionKind::Tidal { .. } => "tidal",
            ErosionKind::River => "river",
            ErosionKind::Wind { .. } => "wind",
            ErosionKind::Canyon(_) => "canyon",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind_is_thermal() {
        assert_eq!(ErosionKind::default(), ErosionKind::Thermal);
        assert_eq!(ErosionKind::default().name(), "thermal");
    }
}
