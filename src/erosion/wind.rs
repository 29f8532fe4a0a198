//! Wind-driven sand transport.

use tracing::debug;

use crate::noise::NoiseField;
use crate::terrain::Grid;

/// Height moved from a dig cell to its pile cell.
const WIND_TRANSFER: f32 = 0.001;
/// Row spacing of the sweep.
const ROW_STRIDE: usize = 10;
/// Distance between dig and pile along the wind.
const PILE_DISTANCE: i64 = 5;
const NOISE_FREQUENCY: f32 = 0.06;
const NOISE_GAIN: f32 = 20.0;

/// Moves small amounts of height downwind.
///
/// Sweeps an oversized coordinate window (about four times the grid in each
/// direction so every rotation still covers it). For each sample a noise
/// wobble offsets the row, a dig point and a pile point five units further
/// along are rotated by `direction_deg`, and when both land inside the grid a
/// fixed amount moves from dig to pile. Total height is conserved.
pub fn wind(grid: &mut Grid, strength: f32, direction_deg: f32) {
    debug!(width = grid.width(), height = grid.height(), strength, direction_deg, "wind erosion");

    let field = NoiseField::default();
    let angle = direction_deg.to_radians();
    let sin = -angle.sin();
    let cos = angle.cos();
    let width = grid.width() as i64;
    let height = grid.height() as i64;
    let max_x = (width - 1) as f32;
    let max_y = (height - 1) as f32;
    // Past the sweep window a wobble only moves points off the grid.
    let reach = (4 * (width + height)) as f32;

    let rotate = |x: i64, y: i64| -> (f32, f32) {
        let (x, y) = (x as f32, y as f32);
        (x * cos - y * sin, y * cos + x * sin)
    };
    let inside = |(x, y): (f32, f32)| x >= 0.0 && y >= 0.0 && x <= max_x && y <= max_y;

    let mut map = grid.clone();
    for y in (-(height - 1) * 2..=height * 2).step_by(ROW_STRIDE) {
        for x in -(width - 1) * 2..=width * 2 {
            let wobble = field.sample(x as f32 * NOISE_FREQUENCY, y as f32 * NOISE_FREQUENCY) * NOISE_GAIN * strength;
            let wobble = wobble.clamp(-reach, reach) as i64;
            let dig = rotate(x, y + wobble);
            let pile = rotate(x, y + PILE_DISTANCE + wobble);
            if inside(dig) && inside(pile) {
                map.add(dig.0 as usize, dig.1 as usize, -WIND_TRANSFER);
                map.add(pile.0 as usize, pile.1 as usize, WIND_TRANSFER);
            }
        }
    }
    grid.commit(map);
}
