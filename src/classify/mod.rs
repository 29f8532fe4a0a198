//! Surface classification: per-cell layer weights from height and slope bands.
//!
//! One [`LayerRule`] per host layer (splat texture, vegetation prototype,
//! detail layer). A rule matches a cell when the cell's height falls inside the
//! rule's noise-jittered height band and its slope inside the slope band.
//! Matching rules share the cell's weight equally.

mod config;
mod slope;

pub use config::{DegeneratePolicy, LayerRule};
pub use slope::{GridSlope, SlopeSampler};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{TerrainError, TerrainResult};
use crate::noise::NoiseField;
use crate::terrain::{Grid, LayerWeights};

/// Computes a normalized weight vector for every cell.
///
/// For each rule the height band is `[height_min - offset, height_max + offset]`
/// with `offset = blend_offset + noise(x * noise_x_scale, y * noise_y_scale) *
/// noise_amplitude`; both bands are inclusive. The slope sampler receives
/// `x / (width - 1)` and `y / (height - 1)`. Weights are divided by their sum,
/// so every matched cell sums to 1. Cells no rule matched follow `policy`.
///
/// # Errors
/// `InvalidParameter` for a non-finite rule field, `DegenerateNormalization`
/// for the first unmatched cell (row-major) under [`DegeneratePolicy::Reject`].
pub fn classify<S>(
    grid: &Grid,
    slope: &S,
    rules: &[LayerRule],
    policy: DegeneratePolicy,
) -> TerrainResult<LayerWeights>
where
    S: SlopeSampler + Sync + ?Sized,
{
    for rule in rules {
        rule.validate()?;
    }
    let (width, height) = (grid.width(), grid.height());
    let layers = rules.len();
    debug!(width, height, layers, ?policy, "classify");

    if layers == 0 {
        return match policy {
            DegeneratePolicy::Zero => {
                warn!("no layer rules; every cell left unmatched");
                Ok(LayerWeights::from_parts(width, height, 0, Vec::new(), width * height))
            }
            DegeneratePolicy::Reject => Err(TerrainError::DegenerateNormalization { x: 0, y: 0 }),
        };
    }

    let field = NoiseField::default();
    let u_span = width.saturating_sub(1).max(1) as f32;
    let v_span = height.saturating_sub(1).max(1) as f32;

    let mut weights = vec![0.0f32; width * height * layers];
    let unmatched: usize = weights
        .par_chunks_mut(width * layers)
        .enumerate()
        .map(|(y, row)| {
            let mut unmatched = 0;
            for (x, cell) in row.chunks_mut(layers).enumerate() {
                let h = grid.get(x, y);
                let steepness = slope.slope_deg(x as f32 / u_span, y as f32 / v_span);
                for (weight, rule) in cell.iter_mut().zip(rules) {
                    let noise = field.sample(x as f32 * rule.noise_x_scale, y as f32 * rule.noise_y_scale)
                        * rule.noise_amplitude;
                    let offset = rule.blend_offset + noise;
                    let in_height = h >= rule.height_min - offset && h <= rule.height_max + offset;
                    let in_slope = steepness >= rule.slope_min && steepness <= rule.slope_max;
                    *weight = if in_height && in_slope { 1.0 } else { 0.0 };
                }

                let sum: f32 = cell.iter().sum();
                if sum > 0.0 {
                    cell.iter_mut().for_each(|w| *w /= sum);
                } else {
                    unmatched += 1;
                }
            }
            unmatched
        })
        .sum();

    let layer_weights = LayerWeights::from_parts(width, height, layers, weights, unmatched);
    if unmatched > 0 {
        match policy {
            DegeneratePolicy::Zero => {
                warn!(unmatched, "cells matched no layer rule; left at zero weight");
            }
            DegeneratePolicy::Reject => {
                let first = (0..width * height)
                    .find(|&i| layer_weights.cell(i % width, i / width).iter().all(|&w| w == 0.0))
                    .unwrap_or(0);
                return Err(TerrainError::DegenerateNormalization {
                    x: first % width,
                    y: first / width,
                });
            }
        }
    }
    Ok(layer_weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_slope(_: f32, _: f32) -> f32 {
        0.0
    }

    fn ramp(width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                grid.set(x, y, x as f32 / (width - 1) as f32);
            }
        }
        grid
    }

    fn band(name: &str, lo: f32, hi: f32) -> LayerRule {
        LayerRule {
            name: name.to_string(),
            height_min: lo,
            height_max: hi,
            slope_min: 0.0,
            slope_max: 90.0,
            noise_amplitude: 0.0,
            blend_offset: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_matched_cells_sum_to_one() {
        let grid = ramp(32, 8);
        let rules = vec![
            band("sand", 0.0, 0.4),
            band("grass", 0.3, 0.8),
            band("rock", 0.7, 1.0),
            LayerRule {
                noise_amplitude: 0.2,
                ..band("scree", 0.2, 0.6)
            },
        ];
        let weights = classify(&grid, &flat_slope, &rules, DegeneratePolicy::Zero).unwrap();
        assert_eq!(weights.unmatched_cells(), 0);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let sum: f32 = weights.cell(x, y).iter().sum();
                assert!((sum - 1.0).abs() < 1e-5, "cell ({x},{y}) sums to {sum}");
            }
        }
    }

    #[test]
    fn test_overlapping_rules_split_weight() {
        let mut grid = Grid::new(2, 2).unwrap();
        grid.fill(0.5);
        let rules = vec![band("a", 0.0, 1.0), band("b", 0.4, 0.6)];
        let weights = classify(&grid, &flat_slope, &rules, DegeneratePolicy::Zero).unwrap();
        assert_eq!(weights.cell(1, 1), &[0.5, 0.5]);
    }

    #[test]
    fn test_slope_band_filters() {
        let mut grid = Grid::new(4, 4).unwrap();
        grid.fill(0.5);
        // Left half steep, right half flat.
        let slope = |u: f32, _v: f32| if u < 0.5 { 60.0 } else { 5.0 };
        let rules = vec![
            LayerRule {
                slope_min: 30.0,
                slope_max: 90.0,
                ..band("cliff", 0.0, 1.0)
            },
            LayerRule {
                slope_min: 0.0,
                slope_max: 30.0,
                ..band("meadow", 0.0, 1.0)
            },
        ];
        let weights = classify(&grid, &slope, &rules, DegeneratePolicy::Zero).unwrap();
        assert_eq!(weights.cell(0, 2), &[1.0, 0.0]);
        assert_eq!(weights.cell(3, 2), &[0.0, 1.0]);
        assert_eq!(weights.layer_mask(0).iter().filter(|&&w| w == 1.0).count(), 8);
    }

    #[test]
    fn test_unmatched_cells_stay_zero() {
        let grid = ramp(10, 3);
        let rules = vec![band("low", 0.0, 0.3)];
        let weights = classify(&grid, &flat_slope, &rules, DegeneratePolicy::Zero).unwrap();
        assert_eq!(weights.cell(9, 0), &[0.0]);
        assert_eq!(weights.cell(0, 0), &[1.0]);
        assert!(weights.as_slice().iter().all(|w| !w.is_nan()));
        assert_eq!(weights.unmatched_cells(), 7 * 3);
    }

    #[test]
    fn test_reject_policy_reports_first_unmatched_cell() {
        let grid = ramp(10, 3);
        let rules = vec![band("low", 0.0, 0.3)];
        let err = classify(&grid, &flat_slope, &rules, DegeneratePolicy::Reject).unwrap_err();
        assert_eq!(err, TerrainError::DegenerateNormalization { x: 3, y: 0 });
    }

    #[test]
    fn test_empty_rules_follow_policy() {
        let grid = ramp(4, 3);
        let zero = classify(&grid, &flat_slope, &[], DegeneratePolicy::Zero).unwrap();
        assert_eq!(zero.layer_count(), 0);
        assert_eq!(zero.unmatched_cells(), 12);

        let err = classify(&grid, &flat_slope, &[], DegeneratePolicy::Reject).unwrap_err();
        assert_eq!(err, TerrainError::DegenerateNormalization { x: 0, y: 0 });
    }

    #[test]
    fn test_noise_moves_band_edge_per_row() {
        let grid = ramp(64, 16);
        let matched_per_row = |rule: &LayerRule| -> Vec<usize> {
            let weights = classify(&grid, &flat_slope, std::slice::from_ref(rule), DegeneratePolicy::Zero).unwrap();
            (0..grid.height())
                .map(|y| (0..grid.width()).filter(|&x| weights.cell(x, y)[0] == 1.0).count())
                .collect()
        };

        let plain = band("low", -1.0, 0.5);
        let flat_edges = matched_per_row(&plain);
        assert!(flat_edges.iter().all(|&n| n == flat_edges[0]));

        let jittered = LayerRule {
            noise_amplitude: 0.3,
            noise_x_scale: 0.3,
            noise_y_scale: 0.3,
            ..plain
        };
        let edges = matched_per_row(&jittered);
        // The offset is never negative, so every row keeps at least the plain band.
        assert!(edges.iter().all(|&n| n >= flat_edges[0]));
        assert!(
            edges.iter().any(|&n| n != edges[0]),
            "band edge did not vary across rows: {edges:?}"
        );
    }

    #[test]
    fn test_blend_offset_widens_band() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.fill(0.45);
        let narrow = vec![band("a", 0.0, 0.4)];
        let widened = vec![LayerRule {
            blend_offset: 0.1,
            ..band("a", 0.0, 0.4)
        }];
        let none = classify(&grid, &flat_slope, &narrow, DegeneratePolicy::Zero).unwrap();
        let some = classify(&grid, &flat_slope, &widened, DegeneratePolicy::Zero).unwrap();
        assert_eq!(none.unmatched_cells(), 9);
        assert_eq!(some.unmatched_cells(), 0);
    }

    #[test]
    fn test_grid_slope_drives_classification() {
        let grid = ramp(11, 11);
        let slope = GridSlope::new(&grid, 10.0, 10.0);
        let rules = vec![LayerRule {
            slope_min: 40.0,
            slope_max: 50.0,
            ..band("ramp", -1.0, 2.0)
        }];
        let weights = classify(&grid, &slope, &rules, DegeneratePolicy::Reject).unwrap();
        assert!(weights.as_slice().iter().all(|&w| w == 1.0));
    }
}
