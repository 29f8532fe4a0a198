//! Slope samplers consumed by the classifier.

use glam::Vec2;

use crate::terrain::Grid;

/// Steepness in degrees at normalized coordinates `u, v` in `[0, 1]`.
pub trait SlopeSampler {
    fn slope_deg(&self, u: f32, v: f32) -> f32;
}

impl<F> SlopeSampler for F
where
    F: Fn(f32, f32) -> f32,
{
    fn slope_deg(&self, u: f32, v: f32) -> f32 {
        self(u, v)
    }
}

/// Slope derived from a height grid's local gradient.
///
/// The grid spans `terrain_size` world units horizontally and a height of
/// 1.0 maps to `height_scale` world units.
#[derive(Debug, Clone, Copy)]
pub struct GridSlope<'a> {
    grid: &'a Grid,
    terrain_size: f32,
    height_scale: f32,
}

impl<'a> GridSlope<'a> {
    pub fn new(grid: &'a Grid, terrain_size: f32, height_scale: f32) -> Self {
        Self {
            grid,
            terrain_size,
            height_scale,
        }
    }

    /// Central-difference gradient at cell `(x, y)`, one-sided at the edges.
    fn gradient(&self, x: usize, y: usize) -> Vec2 {
        let grid = self.grid;
        let axis = |lo: (usize, usize), hi: (usize, usize), cells: usize, span: usize| -> f32 {
            if span == 0 {
                return 0.0;
            }
            let spacing = self.terrain_size / span as f32;
            let rise = (grid.get(hi.0, hi.1) - grid.get(lo.0, lo.1)) * self.height_scale;
            rise / (spacing * cells as f32)
        };

        let (x0, x1) = (x.saturating_sub(1), (x + 1).min(grid.width() - 1));
        let (y0, y1) = (y.saturating_sub(1), (y + 1).min(grid.height() - 1));
        Vec2::new(
            axis((x0, y), (x1, y), x1 - x0, grid.width() - 1),
            axis((x, y0), (x, y1), y1 - y0, grid.height() - 1),
        )
    }
}

impl SlopeSampler for GridSlope<'_> {
    fn slope_deg(&self, u: f32, v: f32) -> f32 {
        let to_cell = |t: f32, len: usize| -> usize {
            let max = (len - 1) as f32;
            (t.clamp(0.0, 1.0) * max).round() as usize
        };
        let x = to_cell(u, self.grid.width());
        let y = to_cell(v, self.grid.height());
        self.gradient(x, y).length().atan().to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid_has_zero_slope() {
        let mut grid = Grid::new(9, 9).unwrap();
        grid.fill(0.7);
        let slope = GridSlope::new(&grid, 100.0, 50.0);
        assert_eq!(slope.slope_deg(0.5, 0.5), 0.0);
        assert_eq!(slope.slope_deg(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_ramp_angle() {
        // Heights rise 1.0 over the full width; with equal size and scale that is 45 degrees.
        let mut grid = Grid::new(11, 11).unwrap();
        for y in 0..11 {
            for x in 0..11 {
                grid.set(x, y, x as f32 / 10.0);
            }
        }
        let slope = GridSlope::new(&grid, 10.0, 10.0);
        for (u, v) in [(0.5, 0.5), (0.0, 0.3), (1.0, 0.9)] {
            assert!((slope.slope_deg(u, v) - 45.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_closure_sampler() {
        let sampler = |u: f32, v: f32| (u + v) * 10.0;
        assert_eq!(sampler.slope_deg(0.5, 0.25), 7.5);
    }
}
