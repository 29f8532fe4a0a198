//! Direct height synthesizers: reset, random jitter, image load and fBm layers.

use glam::Vec3;
use image::{GrayImage, ImageBuffer, Luma};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{TerrainError, TerrainResult};
use crate::noise::{NoiseField, NoiseParams};
use crate::random::RandomSource;
use super::config::AccumulateMode;
use super::Grid;

/// A grayscale source read by [`load_from_image`].
pub trait ImageSampler {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (usize, usize);

    /// Grayscale value in `[0, 1]` at pixel `(x, y)`; `(x, y)` is in bounds.
    fn sample(&self, x: usize, y: usize) -> f32;
}

impl ImageSampler for GrayImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width() as usize, self.height() as usize)
    }

    fn sample(&self, x: usize, y: usize) -> f32 {
        f32::from(self.get_pixel(x as u32, y as u32).0[0]) / 255.0
    }
}

impl ImageSampler for ImageBuffer<Luma<u16>, Vec<u16>> {
    fn dimensions(&self) -> (usize, usize) {
        (self.width() as usize, self.height() as usize)
    }

    fn sample(&self, x: usize, y: usize) -> f32 {
        f32::from(self.get_pixel(x as u32, y as u32).0[0]) / 65535.0
    }
}

impl ImageSampler for Grid {
    fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    fn sample(&self, x: usize, y: usize) -> f32 {
        self.get(x, y)
    }
}

/// Sets every cell to 0.
pub fn reset(grid: &mut Grid) {
    grid.fill(0.0);
}

/// Writes an independent uniform value from `[range_lo, range_hi)` into every cell.
pub fn random_jitter<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    range_lo: f32,
    range_hi: f32,
    mode: AccumulateMode,
    rng: &mut R,
) -> TerrainResult<()> {
    if !range_lo.is_finite() || !range_hi.is_finite() || range_lo > range_hi {
        return Err(TerrainError::invalid(
            "range",
            format!("[{range_lo}, {range_hi}) is not a valid range"),
        ));
    }
    debug!(width = grid.width(), height = grid.height(), range_lo, range_hi, ?mode, "random jitter");

    for cell in grid.heights_mut() {
        mode.apply(cell, rng.range_f32(range_lo, range_hi));
    }
    Ok(())
}

/// Point-samples `image` at `(x * scale.x, y * scale.z)` and writes the value
/// times `scale.y` into each cell.
///
/// # Errors
/// `InvalidParameter` for a negative or non-finite scale, `OutOfRange` when
/// the scaled footprint of the grid does not fit inside the image. Both are
/// checked before the grid is touched.
pub fn load_from_image<I: ImageSampler + ?Sized>(
    grid: &mut Grid,
    image: &I,
    scale: Vec3,
    mode: AccumulateMode,
) -> TerrainResult<()> {
    if !scale.is_finite() || scale.x < 0.0 || scale.z < 0.0 {
        return Err(TerrainError::invalid(
            "scale",
            format!("horizontal scale must be finite and non-negative, got {scale}"),
        ));
    }

    let (image_width, image_height) = image.dimensions();
    // Scaled indices grow with x and y, so the far corner bounds the footprint.
    let far_x = scaled_index(grid.width() - 1, scale.x);
    let far_y = scaled_index(grid.height() - 1, scale.z);
    if far_x >= image_width || far_y >= image_height {
        return Err(TerrainError::OutOfRange {
            x: far_x,
            y: far_y,
            width: image_width,
            height: image_height,
        });
    }
    debug!(width = grid.width(), height = grid.height(), image_width, image_height, ?mode, "load from image");

    let width = grid.width();
    for (i, cell) in grid.heights_mut().iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        let value = image.sample(scaled_index(x, scale.x), scaled_index(y, scale.z)) * scale.y;
        mode.apply(cell, value);
    }
    Ok(())
}

#[inline]
fn scaled_index(i: usize, scale: f32) -> usize {
    (i as f32 * scale) as usize
}

/// Writes one fBm layer into the grid.
pub fn perlin_single(grid: &mut Grid, params: &NoiseParams, mode: AccumulateMode) -> TerrainResult<()> {
    params.validate()?;
    debug!(
        width = grid.width(),
        height = grid.height(),
        octaves = params.octaves,
        persistence = params.persistence,
        ?mode,
        "perlin single layer"
    );

    let field = NoiseField::default();
    let width = grid.width();
    grid.heights_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                mode.apply(cell, params.height_at(&field, x as f32, y as f32));
            }
        });
    Ok(())
}

/// Sums every layer per cell, then writes the total once.
///
/// Layers never observe each other's output, so their order does not matter.
pub fn perlin_multi(grid: &mut Grid, layers: &[NoiseParams], mode: AccumulateMode) -> TerrainResult<()> {
    for params in layers {
        params.validate()?;
    }
    debug!(width = grid.width(), height = grid.height(), layers = layers.len(), ?mode, "perlin multi layer");

    let field = NoiseField::default();
    let width = grid.width();
    grid.heights_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let total: f32 = layers
                    .iter()
                    .map(|params| params.height_at(&field, x as f32, y as f32))
                    .sum();
                mode.apply(cell, total);
            }
        });
    Ok(())
}
