//! Point pitting from random droplets.

use tracing::debug;

use crate::random::RandomSource;
use crate::terrain::Grid;

/// Lowers `droplet_count` uniformly chosen cells by `strength` each.
///
/// A cell may be hit more than once.
pub fn rain<R: RandomSource + ?Sized>(grid: &mut Grid, strength: f32, droplet_count: u32, rng: &mut R) {
    debug!(width = grid.width(), height = grid.height(), strength, droplet_count, "rain erosion");

    let mut map = grid.clone();
    for _ in 0..droplet_count {
        let x = rng.index(map.width());
        let y = rng.index(map.height());
        map.add(x, y, -strength);
    }
    grid.commit(map);
}
