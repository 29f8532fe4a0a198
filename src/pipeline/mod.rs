//! Pipeline module for orchestrating a generation session.
//!
//! Provides a trait-based architecture for modular generation stages
//! (synthesis, erosion, smoothing, classification) that run in order against
//! one grid with a single seeded random stream. [`RecipeConfig`] describes the
//! same session declaratively in TOML.

mod config;
mod stage;

pub use config::{RecipeConfig, StageSpec};
pub use stage::{
    ClassifyConfig, ClassifyStage, ErosionStage, GenerationStage, ImageStage, Pipeline, PipelineError,
    PipelineOutput, SmoothStage, StageContext, StageId, SynthesisStage, Synthesizer,
};
