//! Shoreline flattening.

use tracing::debug;

use crate::terrain::Grid;

/// Flattens every shoreline edge to `water_height`.
///
/// Whenever a cell and one of its neighbors sit on opposite sides of the
/// water line (one strictly below, the other strictly above), both are set to
/// exactly `water_height`.
pub fn tidal(grid: &mut Grid, water_height: f32) {
    debug!(width = grid.width(), height = grid.height(), water_height, "tidal erosion");

    let mut map = grid.clone();
    for y in 0..map.height() {
        for x in 0..map.width() {
            for (nx, ny) in map.neighbors(x, y) {
                let here = map.get(x, y);
                let there = map.get(nx, ny);
                let crosses = (here < water_height && there > water_height)
                    || (here > water_height && there < water_height);
                if crosses {
                    map.set(x, y, water_height);
                    map.set(nx, ny, water_height);
                }
            }
        }
    }
    grid.commit(map);
}
