//! Procedural heightmap synthesis, erosion and surface classification.
//!
//! A host owns a [`Grid`] of `f32` elevations and hands it to operators by
//! mutable reference:
//! - height synthesizers (fBm noise layers, Voronoi peaks, diamond-square,
//!   image import, random jitter) build the terrain,
//! - erosion simulators and the box-blur smoother shape it,
//! - the classifier derives per-cell layer weights for texturing and
//!   vegetation.
//!
//! Every stochastic operator takes an injected [`RandomSource`], so a seeded
//! generator reproduces a grid bit for bit. [`Pipeline`] strings operators
//! together, and [`RecipeConfig`] loads a whole session from TOML.

pub mod classify;
pub mod erosion;
pub mod error;
pub mod noise;
pub mod pipeline;
pub mod random;
pub mod smooth;
pub mod terrain;

pub use classify::{classify, DegeneratePolicy, GridSlope, LayerRule, SlopeSampler};
pub use erosion::{erode, CanyonParams, ErosionKind, ErosionParams};
pub use error::{TerrainError, TerrainResult};
pub use noise::{noise_texture, NoiseField, NoiseParams, TextureOptions};
pub use pipeline::{GenerationStage, Pipeline, PipelineError, PipelineOutput, RecipeConfig, StageSpec};
pub use random::{seeded, RandomSource};
pub use smooth::smooth;
pub use terrain::{
    create_grid, get_heights, set_heights, AccumulateMode, Grid, ImageSampler, LayerWeights, MidpointParams,
    VoronoiParams, VoronoiVariant,
};
