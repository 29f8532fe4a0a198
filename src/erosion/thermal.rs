//! Talus collapse toward lower neighbors.

use tracing::debug;

use crate::terrain::Grid;

/// One sequential sweep of talus collapse.
///
/// Cells are visited row by row; for each neighbor that sits more than
/// `strength` below the cell, `cell * amount` moves from the cell onto that
/// neighbor. Transfers are visible to later cells in the same sweep, and the
/// total height is conserved.
pub fn thermal(grid: &mut Grid, strength: f32, amount: f32) {
    debug!(width = grid.width(), height = grid.height(), strength, amount, "thermal erosion");

    let mut map = grid.clone();
    for y in 0..map.height() {
        for x in 0..map.width() {
            for (nx, ny) in map.neighbors(x, y) {
                let here = map.get(x, y);
                if here > map.get(nx, ny) + strength {
                    let moved = here * amount;
                    map.add(x, y, -moved);
                    map.add(nx, ny, moved);
                }
            }
        }
    }
    grid.commit(map);
}
