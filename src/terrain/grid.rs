//! Rectangular elevation grid and bounds-clamped neighbor enumeration.

use serde::{Deserialize, Serialize};

use crate::error::{TerrainError, TerrainResult};
use crate::noise::remap;

/// Offsets of the 3x3 neighborhood, row by row, excluding the center.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A fixed-size 2D array of `f32` elevation samples.
///
/// Values are conceptually in `[0, 1]` but operators may leave them outside
/// that range; nothing clamps implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Height values stored in row-major order (`y * width + x`).
    heights: Vec<f32>,
}

impl Grid {
    /// Creates a zero-filled grid.
    ///
    /// # Errors
    /// `InvalidParameter` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> TerrainResult<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::invalid(
                "dimensions",
                format!("grid must be at least 1x1, got {width}x{height}"),
            ));
        }
        Ok(Self {
            width,
            height,
            heights: vec![0.0; width * height],
        })
    }

    /// Builds a grid from rows (`rows[y][x]`); all rows must share one length.
    pub fn from_rows(rows: &[Vec<f32>]) -> TerrainResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut grid = Self::new(width, height)?;
        grid.set_rows(rows)?;
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Always false; a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.heights[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let i = self.index(x, y);
        self.heights[i] = value;
    }

    /// Adds `delta` to cell `(x, y)`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, delta: f32) {
        let i = self.index(x, y);
        self.heights[i] += delta;
    }

    /// Flat row-major view of the heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    /// Copies the heights out as rows (`rows[y][x]`).
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.heights.chunks(self.width).map(<[f32]>::to_vec).collect()
    }

    /// Overwrites every height from rows (`rows[y][x]`).
    ///
    /// # Errors
    /// `ShapeMismatch` if the rows do not match the grid dimensions; the grid
    /// is left untouched in that case.
    pub fn set_rows(&mut self, rows: &[Vec<f32>]) -> TerrainResult<()> {
        let got_width = rows.first().map_or(0, Vec::len);
        if rows.len() != self.height || rows.iter().any(|r| r.len() != self.width) {
            return Err(TerrainError::ShapeMismatch {
                width: self.width,
                height: self.height,
                got_width,
                got_height: rows.len(),
            });
        }
        for (dst, src) in self.heights.chunks_mut(self.width).zip(rows) {
            dst.copy_from_slice(src);
        }
        Ok(())
    }

    /// Replaces this grid's heights with `other`'s. Shapes must already match.
    pub(crate) fn commit(&mut self, other: Grid) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        self.heights = other.heights;
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: f32) {
        self.heights.fill(value);
    }

    /// Global min and max height.
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }

    /// Stretches the heights linearly onto `[0, 1]`. A flat grid becomes all zero.
    pub fn normalize(&mut self) {
        let (lo, hi) = self.height_range();
        for h in &mut self.heights {
            *h = remap(*h, lo, hi, 0.0, 1.0);
        }
    }

    /// In-bounds cells of the 3x3 neighborhood of `(x, y)`, excluding the cell itself.
    ///
    /// Interior cells have 8 neighbors, edge cells 5 and corners 3.
    pub fn neighbors(&self, x: usize, y: usize) -> Neighbors {
        Neighbors {
            x: x as i64,
            y: y as i64,
            width: self.width as i64,
            height: self.height as i64,
            next: 0,
        }
    }
}

/// Iterator returned by [`Grid::neighbors`].
#[derive(Debug, Clone)]
pub struct Neighbors {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    next: usize,
}

impl Iterator for Neighbors {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < NEIGHBOR_OFFSETS.len() {
            let (dx, dy) = NEIGHBOR_OFFSETS[self.next];
            self.next += 1;
            let nx = self.x + i64::from(dx);
            let ny = self.y + i64::from(dy);
            if nx >= 0 && ny >= 0 && nx < self.width && ny < self.height {
                return Some((nx as usize, ny as usize));
            }
        }
        None
    }
}

/// Creates a zero-filled grid for the host.
pub fn create_grid(width: usize, height: usize) -> TerrainResult<Grid> {
    Grid::new(width, height)
}

/// Host accessor: the heights as rows (`rows[y][x]`).
pub fn get_heights(grid: &Grid) -> Vec<Vec<f32>> {
    grid.to_rows()
}

/// Host mutator: replaces the heights from rows (`rows[y][x]`).
pub fn set_heights(grid: &mut Grid, rows: &[Vec<f32>]) -> TerrainResult<()> {
    grid.set_rows(rows)
}
