//! Standalone fBm noise textures, optionally seamless.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TerrainResult;
use crate::terrain::Grid;
use super::fractal::{NoiseField, NoiseParams};

/// Options for [`noise_texture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureOptions {
    /// Blend four offset samples so opposite edges tile.
    pub seamless: bool,
    /// Stretch the finished texture onto the full `[0, 1]` range.
    pub remap: bool,
}

/// Renders a `width`x`height` grayscale fBm texture into a fresh grid.
pub fn noise_texture(
    width: usize,
    height: usize,
    params: &NoiseParams,
    options: TextureOptions,
) -> TerrainResult<Grid> {
    params.validate()?;
    let mut texture = Grid::new(width, height)?;
    debug!(width, height, seamless = options.seamless, remap = options.remap, "noise texture");

    let field = NoiseField::default();
    texture
        .heights_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, texel) in row.iter_mut().enumerate() {
                *texel = if options.seamless {
                    seamless_sample(&field, params, x as f32, y as f32, width as f32, height as f32)
                } else {
                    params.height_at(&field, x as f32, y as f32)
                };
            }
        });

    if options.remap {
        texture.normalize();
    }
    Ok(texture)
}

/// Bilinear blend of the samples at `(x, y)`, `(x, y+h)`, `(x+w, y)` and
/// `(x+w, y+h)`, weighted so the texture wraps with period `(w, h)`.
pub(crate) fn seamless_sample(field: &NoiseField, params: &NoiseParams, x: f32, y: f32, w: f32, h: f32) -> f32 {
    let u = x / w;
    let v = y / h;
    let n00 = params.height_at(field, x, y);
    let n01 = params.height_at(field, x, y + h);
    let n10 = params.height_at(field, x + w, y);
    let n11 = params.height_at(field, x + w, y + h);

    u * v * n00 + u * (1.0 - v) * n01 + (1.0 - u) * v * n10 + (1.0 - u) * (1.0 - v) * n11
}
