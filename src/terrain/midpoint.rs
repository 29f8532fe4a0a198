//! Diamond-square midpoint displacement.

use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::random::RandomSource;
use super::config::{AccumulateMode, MidpointParams};
use super::Grid;

/// Runs diamond-square over a square grid of side `2^n + 1`.
///
/// Each level sets square centers from their four corners, then the edge
/// midpoints of every square whose outer diamond neighbors fall inside
/// `[1, width - 1]`; squares failing that test keep their edge midpoints as
/// they were. Offsets are drawn from `[height_min, height_max)`, and both
/// bounds are multiplied by `dampener_power^-roughness` after every level.
/// The square size halves with integer truncation, so the last level has
/// size 1 and its "center" is the square's own origin cell.
///
/// # Errors
/// `InvalidParameter` if the grid is not square with side `2^n + 1` or the
/// parameters are inconsistent.
pub fn midpoint_displacement<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    params: &MidpointParams,
    mode: AccumulateMode,
    rng: &mut R,
) -> TerrainResult<()> {
    params.validate()?;
    let side = grid.width();
    if grid.height() != side || side < 3 || !(side - 1).is_power_of_two() {
        return Err(TerrainError::invalid(
            "dimensions",
            format!(
                "midpoint displacement needs a square 2^n+1 grid, got {}x{}",
                grid.width(),
                grid.height()
            ),
        ));
    }
    debug!(side, height_min = params.height_min, height_max = params.height_max, ?mode, "midpoint displacement");

    let mut map = mode.starting_grid(grid);
    let width = side - 1;
    let decay = params.decay();
    let mut height_min = params.height_min;
    let mut height_max = params.height_max;
    let mut square_size = width;

    while square_size > 0 {
        let half = square_size / 2;

        // Square step.
        for x in (0..width).step_by(square_size) {
            for y in (0..width).step_by(square_size) {
                let corner_x = x + square_size;
                let corner_y = y + square_size;
                let (mid_x, mid_y) = (x + half, y + half);
                let average = (map.get(x, y)
                    + map.get(corner_x, y)
                    + map.get(x, corner_y)
                    + map.get(corner_x, corner_y))
                    / 4.0;
                map.set(mid_x, mid_y, average + rng.range_f32(height_min, height_max));
            }
        }

        // Diamond step.
        for x in (0..width).step_by(square_size) {
            for y in (0..width).step_by(square_size) {
                let corner_x = x + square_size;
                let corner_y = y + square_size;
                let (mid_x, mid_y) = (x + half, y + half);

                // Outer diamond points; skip squares whose diamonds leave the interior.
                let left = mid_x as i64 - square_size as i64;
                let down = mid_y as i64 - square_size as i64;
                let right = mid_x + square_size;
                let up = mid_y + square_size;
                if left <= 0 || down <= 0 || right >= width - 1 || up >= width - 1 {
                    continue;
                }
                let (left, down) = (left as usize, down as usize);

                let bottom = (map.get(mid_x, mid_y) + map.get(x, y) + map.get(mid_x, down) + map.get(corner_x, y))
                    / 4.0;
                map.set(mid_x, y, bottom + rng.range_f32(height_min, height_max));

                let top = (map.get(x, corner_y)
                    + map.get(mid_x, mid_y)
                    + map.get(corner_x, corner_y)
                    + map.get(mid_x, up))
                    / 4.0;
                map.set(mid_x, corner_y, top + rng.range_f32(height_min, height_max));

                let left_mid = (map.get(x, y) + map.get(left, mid_y) + map.get(x, corner_y) + map.get(mid_x, mid_y))
                    / 4.0;
                map.set(x, mid_y, left_mid + rng.range_f32(height_min, height_max));

                let right_mid = (map.get(mid_x, y)
                    + map.get(corner_x, corner_y)
                    + map.get(right, mid_y)
                    + map.get(corner_x, y))
                    / 4.0;
                map.set(corner_x, mid_y, right_mid + rng.range_f32(height_min, height_max));
            }
        }

        square_size /= 2;
        height_min *= decay;
        height_max *= decay;
    }

    grid.commit(map);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    #[test]
    fn test_rejects_non_power_of_two_sides() {
        let params = MidpointParams::default();
        for (w, h) in [(16, 16), (17, 9), (2, 2), (1, 1)] {
            let mut grid = Grid::new(w, h).unwrap();
            assert!(
                midpoint_displacement(&mut grid, &params, AccumulateMode::Overwrite, &mut seeded(1)).is_err(),
                "{}x{} should be rejected",
                w,
                h
            );
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let params = MidpointParams {
            roughness: 0.0,
            ..Default::default()
        };
        let mut a = Grid::new(65, 65).unwrap();
        let mut b = Grid::new(65, 65).unwrap();
        midpoint_displacement(&mut a, &params, AccumulateMode::Overwrite, &mut seeded(77)).unwrap();
        midpoint_displacement(&mut b, &params, AccumulateMode::Overwrite, &mut seeded(77)).unwrap();
        assert_eq!(a.heights(), b.heights());
        assert!(a.heights().iter().any(|&h| h != 0.0));
    }

    #[test]
    fn test_zero_offsets_keep_flat_grid() {
        let params = MidpointParams {
            height_min: 0.0,
            height_max: 0.0,
            ..Default::default()
        };
        let mut grid = Grid::new(513, 513).unwrap();
        midpoint_displacement(&mut grid, &params, AccumulateMode::Overwrite, &mut seeded(3)).unwrap();
        assert!(grid.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_accumulate_preserves_flat_offset() {
        // Averages of a constant field stay constant when no offset is added.
        let params = MidpointParams {
            height_min: 0.0,
            height_max: 0.0,
            ..Default::default()
        };
        let mut grid = Grid::new(33, 33).unwrap();
        grid.fill(0.25);
        midpoint_displacement(&mut grid, &params, AccumulateMode::Accumulate, &mut seeded(3)).unwrap();
        assert!(grid.heights().iter().all(|&h| (h - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_far_edges_untouched() {
        let params = MidpointParams {
            height_min: 0.5,
            height_max: 1.0,
            roughness: 0.0,
            ..Default::default()
        };
        let mut grid = Grid::new(17, 17).unwrap();
        midpoint_displacement(&mut grid, &params, AccumulateMode::Overwrite, &mut seeded(8)).unwrap();
        // The far row and column are only diamond targets, and those diamonds are always skipped.
        assert!((0..17).all(|x| grid.get(x, 16) == 0.0));
        assert!((0..17).all(|y| grid.get(16, y) == 0.0));
        // The center is a square-step target, so it picks up an offset.
        assert!(grid.get(8, 8) >= 0.5);
    }
}
