//! Erosion simulators.
//!
//! Every simulator reads the current grid, mutates a private working copy
//! and commits it in one assignment, so a caller never observes a partially
//! eroded grid. [`erode`] dispatches on [`ErosionKind`] and runs the
//! configured smoothing passes afterwards.

mod canyon;
mod config;
mod rain;
mod river;
mod thermal;
mod tidal;
mod wind;

pub use canyon::canyon;
pub use config::{CanyonParams, ErosionKind, ErosionParams};
pub use rain::rain;
pub use river::river;
pub use thermal::thermal;
pub use tidal::tidal;
pub use wind::wind;

use tracing::debug;

use crate::error::TerrainResult;
use crate::random::RandomSource;
use crate::smooth::smooth;
use crate::terrain::Grid;

/// Runs one erosion kind, then `params.smooth_passes_after` smoothing passes.
///
/// # Errors
/// Whatever the selected simulator rejects; the grid is untouched on error.
pub fn erode<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    kind: &ErosionKind,
    params: &ErosionParams,
    rng: &mut R,
) -> TerrainResult<()> {
    params.validate()?;
    if let ErosionKind::Canyon(canyon_params) = kind {
        canyon_params.validate()?;
    }
    debug!(kind = kind.name(), smooth_passes = params.smooth_passes_after, "erode");

    match kind {
        ErosionKind::Rain => rain(grid, params.strength, params.droplet_count, rng),
        ErosionKind::Thermal => thermal(grid, params.strength, params.amount),
        ErosionKind::Tidal { water_height } => tidal(grid, *water_height),
        ErosionKind::River => river(grid, params, rng)?,
        ErosionKind::Wind { direction_deg } => wind(grid, params.strength, *direction_deg),
        ErosionKind::Canyon(canyon_params) => canyon(grid, canyon_params, rng)?,
    }

    smooth(grid, params.smooth_passes_after);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    #[test]
    fn test_erode_smooths_afterwards() {
        let params = ErosionParams {
            strength: 0.5,
            droplet_count: 1,
            smooth_passes_after: 0,
            ..Default::default()
        };
        let mut raw = Grid::new(9, 9).unwrap();
        erode(&mut raw, &ErosionKind::Rain, &params, &mut seeded(6)).unwrap();

        let smoothed_params = ErosionParams {
            smooth_passes_after: 2,
            ..params
        };
        let mut smoothed = Grid::new(9, 9).unwrap();
        erode(&mut smoothed, &ErosionKind::Rain, &smoothed_params, &mut seeded(6)).unwrap();

        let (raw_lo, _) = raw.height_range();
        let (smooth_lo, _) = smoothed.height_range();
        assert!((raw_lo + 0.5).abs() < 1e-6);
        assert!(smooth_lo > raw_lo);
    }

    #[test]
    fn test_invalid_river_leaves_grid() {
        let params = ErosionParams {
            solubility: 0.0,
            ..Default::default()
        };
        let mut grid = Grid::new(8, 8).unwrap();
        grid.fill(0.4);
        let before = grid.clone();
        assert!(erode(&mut grid, &ErosionKind::River, &params, &mut seeded(2)).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_every_kind_runs() {
        let kinds = [
            ErosionKind::Rain,
            ErosionKind::Thermal,
            ErosionKind::Tidal { water_height: 0.3 },
            ErosionKind::River,
            ErosionKind::Wind { direction_deg: 45.0 },
            ErosionKind::Canyon(CanyonParams::default()),
        ];
        for kind in &kinds {
            let mut grid = Grid::new(17, 17).unwrap();
            let mut rng = seeded(8);
            for h in grid.heights_mut() {
                *h = rng.range_f32(0.2, 0.8);
            }
            erode(&mut grid, kind, &ErosionParams::default(), &mut rng).unwrap();
            assert!(grid.heights().iter().all(|h| h.is_finite()), "{}", kind.name());
        }
    }

    #[test]
    fn test_kind_from_toml() {
        let kind: ErosionKind = toml::from_str("type = \"wind\"\ndirection_deg = 90.0").unwrap();
        assert_eq!(kind, ErosionKind::Wind { direction_deg: 90.0 });
        let kind: ErosionKind = toml::from_str("type = \"canyon\"\ndig_depth = 0.1").unwrap();
        match kind {
            ErosionKind::Canyon(p) => assert!((p.dig_depth - 0.1).abs() < 1e-6),
            other => panic!("unexpected {other:?}"),
        }
    }
}
