//! Voronoi peak tessellation.
//!
//! Random peaks are dropped onto the grid and each raises the surrounding
//! cells along a distance falloff. Cells only ever take the maximum of their
//! current height and a peak's profile, so the result never digs divots and
//! does not depend on the order peaks land in.

use std::f32::consts::PI;

use glam::Vec2;
use tracing::debug;

use crate::error::TerrainResult;
use crate::random::RandomSource;
use super::config::{AccumulateMode, VoronoiParams, VoronoiVariant};
use super::Grid;

/// A candidate peak: grid position and summit height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub x: usize,
    pub y: usize,
    pub height: f32,
}

impl VoronoiVariant {
    /// Height contributed by a peak of `summit` at normalized distance `d`.
    pub fn profile(self, summit: f32, d: f32, falloff: f32, drop_off: f32) -> f32 {
        match self {
            VoronoiVariant::Linear => summit - d * falloff,
            VoronoiVariant::Power => summit - d.powf(drop_off) * falloff,
            VoronoiVariant::Combined => summit - d * falloff - d.powf(drop_off),
            VoronoiVariant::PowerSin => {
                summit - (d * 3.0).powf(falloff) - (d * 2.0 * PI).sin() / drop_off
            }
        }
    }
}

/// Places `params.peak_count` random peaks and raises the terrain around them.
///
/// Peaks are drawn as `(x, height, y)`; a peak whose cell is already at or
/// above its height is skipped entirely.
pub fn voronoi<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    params: &VoronoiParams,
    mode: AccumulateMode,
    rng: &mut R,
) -> TerrainResult<()> {
    params.validate()?;

    let mut working = mode.starting_grid(grid);
    let mut accepted = 0usize;
    for _ in 0..params.peak_count {
        let x = rng.index(working.width());
        let height = rng.range_f32(params.min_height, params.max_height);
        let y = rng.index(working.height());
        if place_peak(&mut working, params, Peak { x, y, height }) {
            accepted += 1;
        }
    }
    debug!(
        width = grid.width(),
        height = grid.height(),
        requested = params.peak_count,
        accepted,
        variant = ?params.variant,
        "voronoi tessellation"
    );

    grid.commit(working);
    Ok(())
}

/// Raises `grid` around a single peak. Returns false if the peak was rejected.
pub fn place_peak(grid: &mut Grid, params: &VoronoiParams, peak: Peak) -> bool {
    if grid.get(peak.x, peak.y) >= peak.height {
        return false;
    }
    grid.set(peak.x, peak.y, peak.height);

    let max_distance = Vec2::new(grid.width() as f32, grid.height() as f32).length();
    let summit = Vec2::new(peak.x as f32, peak.y as f32);

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if (x, y) == (peak.x, peak.y) {
                continue;
            }
            let d = summit.distance(Vec2::new(x as f32, y as f32)) / max_distance;
            let h = params.variant.profile(peak.height, d, params.falloff, params.drop_off);
            if grid.get(x, y) < h {
                grid.set(x, y, h);
            }
        }
    }
    true
}
