//! Iterative 3x3 box blur.

use rayon::prelude::*;
use tracing::debug;

use crate::terrain::Grid;

/// Runs `iterations` passes of a 3x3 box blur.
///
/// Each cell becomes the mean of itself and its in-bounds neighbors, so edge
/// cells divide by 6 and corners by 4. Every pass reads a snapshot of the
/// previous one. `iterations == 0` leaves the grid untouched.
pub fn smooth(grid: &mut Grid, iterations: u32) {
    if iterations == 0 {
        return;
    }
    debug!(width = grid.width(), height = grid.height(), iterations, "smooth");

    let width = grid.width();
    let mut snapshot = grid.clone();
    for pass in 0..iterations {
        if pass > 0 {
            snapshot.heights_mut().copy_from_slice(grid.heights());
        }
        let source = &snapshot;
        grid.heights_mut()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let mut sum = source.get(x, y);
                    let mut count = 1.0f32;
                    for (nx, ny) in source.neighbors(x, y) {
                        sum += source.get(nx, ny);
                        count += 1.0;
                    }
                    *cell = sum / count;
                }
            });
    }
}
