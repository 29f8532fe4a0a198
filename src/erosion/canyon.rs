//! Canyon carving by a depth-bounded crawl.

use tracing::debug;

use crate::error::TerrainResult;
use crate::random::RandomSource;
use crate::terrain::Grid;
use super::config::CanyonParams;

/// Crawl directions; `(0, 1)` appears twice unless collapsed.
const CRAWL_DIRECTIONS: [(i64, i64); 5] = [(1, 0), (-1, 0), (0, 1), (0, -1), (0, 1)];
/// Extra depth jitter on top of `bank_slope` per crawl step.
const BANK_JITTER: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
struct CrawlFrame {
    x: i64,
    y: i64,
    depth: f32,
    next: usize,
}

/// Carves a meandering canyon from the left edge.
///
/// The entry point starts at column 0 on a random row and advances by
/// `[1, 3)` columns and `[-2, 3)` rows while it stays on the grid. At every
/// entry point a crawl lowers the cell to `height - dig_depth`, where
/// `height` is the value before this call, so overlapping entries share one
/// canyon floor instead of digging below each other. The crawl then spreads
/// to adjacent cells in depth-first order, each step asking for a shallower
/// cut (`+ bank_slope` plus up to 0.01 jitter). A cell is only cut when the
/// requested depth is above `floor` and below its current height, so the
/// canyon never raises terrain and its banks close off on their own.
///
/// # Errors
/// `InvalidParameter` if `bank_slope` is not positive or any field is not finite.
pub fn canyon<R: RandomSource + ?Sized>(grid: &mut Grid, params: &CanyonParams, rng: &mut R) -> TerrainResult<()> {
    params.validate()?;
    debug!(
        width = grid.width(),
        height = grid.height(),
        dig_depth = params.dig_depth,
        bank_slope = params.bank_slope,
        floor = params.floor,
        "canyon erosion"
    );

    let directions: &[(i64, i64)] = if params.collapse_duplicate_direction {
        &CRAWL_DIRECTIONS[..4]
    } else {
        &CRAWL_DIRECTIONS
    };

    let mut map = grid.clone();
    let mut stack = Vec::new();
    let mut x = 0i64;
    let mut y = rng.index(grid.height()) as i64;
    let mut entries = 0usize;

    while grid.contains(x, y) {
        // Measured from the uncarved grid.
        let requested = grid.get(x as usize, y as usize) - params.dig_depth;
        crawl(&mut map, &mut stack, x, y, requested, params, directions, rng);
        entries += 1;
        x += i64::from(rng.range_i32(1, 3));
        y += i64::from(rng.range_i32(-2, 3));
    }
    debug!(entries, "canyon carved");

    grid.commit(map);
    Ok(())
}

/// Lowers `(x, y)` to `depth` if it is on the grid, above the floor and
/// currently higher than `depth`.
fn try_carve(map: &mut Grid, x: i64, y: i64, depth: f32, floor: f32) -> bool {
    if !map.contains(x, y) || depth <= floor {
        return false;
    }
    let (x, y) = (x as usize, y as usize);
    if map.get(x, y) <= depth {
        return false;
    }
    map.set(x, y, depth);
    true
}

#[allow(clippy::too_many_arguments)]
fn crawl<R: RandomSource + ?Sized>(
    map: &mut Grid,
    stack: &mut Vec<CrawlFrame>,
    x: i64,
    y: i64,
    depth: f32,
    params: &CanyonParams,
    directions: &[(i64, i64)],
    rng: &mut R,
) {
    if !try_carve(map, x, y, depth, params.floor) {
        return;
    }
    stack.clear();
    stack.push(CrawlFrame { x, y, depth, next: 0 });

    while let Some(frame) = stack.last_mut() {
        let Some(&(dx, dy)) = directions.get(frame.next) else {
            stack.pop();
            continue;
        };
        frame.next += 1;

        let child = CrawlFrame {
            x: frame.x + dx,
            y: frame.y + dy,
            depth: frame.depth + rng.range_f32(params.bank_slope, params.bank_slope + BANK_JITTER),
            next: 0,
        };
        if try_carve(map, child.x, child.y, child.depth, params.floor) {
            stack.push(child);
        }
    }
}
