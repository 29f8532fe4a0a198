//! River tracing with random downhill walks.

use tracing::{debug, warn};

use crate::error::{TerrainError, TerrainResult};
use crate::random::{shuffle, RandomSource};
use crate::terrain::Grid;
use super::config::ErosionParams;

/// Carves river channels by tracing random downhill walks.
///
/// An erosion map starts at zero. Each droplet picks a random cell, sets its
/// erosion value to `strength`, then runs `springs_per_droplet` walks from it.
/// A walk shuffles the neighbors of its cell and moves to the first one that
/// is strictly lower in height, giving it the current erosion value minus
/// `solubility`. With no lower neighbor, the current value drops by
/// `solubility` instead. A walk ends once the value under it is `<= 0`.
/// Finally every positive erosion value is subtracted from the heights.
///
/// # Errors
/// `InvalidParameter` if `solubility` is not positive or `strength` is not
/// finite.
pub fn river<R: RandomSource + ?Sized>(grid: &mut Grid, params: &ErosionParams, rng: &mut R) -> TerrainResult<()> {
    params.validate()?;
    if !(params.solubility > 0.0) {
        return Err(TerrainError::invalid(
            "solubility",
            format!("river walks need a positive solubility, got {}", params.solubility),
        ));
    }
    debug!(
        width = grid.width(),
        height = grid.height(),
        strength = params.strength,
        droplets = params.droplet_count,
        springs = params.springs_per_droplet,
        solubility = params.solubility,
        "river erosion"
    );

    // Downhill moves can't revisit a cell, so a walk makes at most len() moves
    // plus the stalls needed to drain `strength`.
    let stalls = (params.strength.max(0.0) / params.solubility).ceil().min(1.0e6) as usize;
    let step_limit = grid.len() + stalls + 1;

    let mut erosion = Grid::new(grid.width(), grid.height())?;
    let mut neighbors = Vec::with_capacity(8);

    for _ in 0..params.droplet_count {
        let start = (rng.index(grid.width()), rng.index(grid.height()));
        erosion.set(start.0, start.1, params.strength);

        for _ in 0..params.springs_per_droplet {
            let (mut x, mut y) = start;
            let mut steps = 0usize;
            while erosion.get(x, y) > 0.0 {
                if steps == step_limit {
                    warn!(x, y, step_limit, "river walk hit its step limit");
                    break;
                }
                steps += 1;

                neighbors.clear();
                neighbors.extend(grid.neighbors(x, y));
                shuffle(rng, &mut neighbors);

                let here = grid.get(x, y);
                let value = erosion.get(x, y);
                match neighbors.iter().copied().find(|&(nx, ny)| grid.get(nx, ny) < here) {
                    Some((nx, ny)) => {
                        erosion.set(nx, ny, value - params.solubility);
                        x = nx;
                        y = ny;
                    }
                    None => {
                        let drained = value - params.solubility;
                        if drained >= value {
                            warn!(x, y, value, "river walk stopped draining");
                            break;
                        }
                        erosion.set(x, y, drained);
                    }
                }
            }
        }
    }

    let mut map = grid.clone();
    for (height, &carve) in map.heights_mut().iter_mut().zip(erosion.heights()) {
        if carve > 0.0 {
            *height -= carve;
        }
    }
    grid.commit(map);
    Ok(())
}
