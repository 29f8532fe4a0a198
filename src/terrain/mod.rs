//! Elevation grid, layer weight maps and the height synthesizers.
//!
//! Every synthesizer takes an explicit [`AccumulateMode`]: `Overwrite`
//! starts from zeros, `Accumulate` builds on the grid's current heights.

mod config;
mod grid;
mod heightmap;
mod layers;
mod midpoint;
mod voronoi;

pub use config::{AccumulateMode, MidpointParams, VoronoiParams, VoronoiVariant};
pub use grid::{create_grid, get_heights, set_heights, Grid, Neighbors};
pub use heightmap::{load_from_image, perlin_multi, perlin_single, random_jitter, reset, ImageSampler};
pub use layers::LayerWeights;
pub use midpoint::midpoint_displacement;
pub use voronoi::{place_peak, voronoi, Peak};
