//! Generation stage trait and pipeline orchestration.

use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::classify::{classify, DegeneratePolicy, GridSlope, LayerRule};
use crate::erosion::{erode, ErosionKind, ErosionParams};
use crate::error::TerrainError;
use crate::noise::NoiseParams;
use crate::random::seeded;
use crate::smooth::smooth;
use crate::terrain::{
    load_from_image, midpoint_displacement, perlin_multi, perlin_single, random_jitter, reset, voronoi,
    AccumulateMode, Grid, ImageSampler, LayerWeights, MidpointParams, VoronoiParams,
};

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Height synthesis (noise, peaks, fractals, images).
    Synthesis,
    Erosion,
    Smooth,
    /// Layer weight classification.
    Classify,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Synthesis => "synthesis",
            StageId::Erosion => "erosion",
            StageId::Smooth => "smooth",
            StageId::Classify => "classify",
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: TerrainError,
    },
    #[error("Invalid recipe: {0}")]
    Recipe(#[from] toml::de::Error),
}

/// Mutable state shared by the stages of one run.
#[derive(Debug)]
pub struct StageContext {
    /// Single random stream consumed by every stochastic stage, in stage order.
    pub rng: ChaCha8Rng,
    pub mode: AccumulateMode,
    /// Output of the most recent classify stage.
    pub layer_weights: Option<LayerWeights>,
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the grid in some way, building upon previous
/// stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Executes the stage, modifying the grid in place.
    ///
    /// A failing stage leaves the grid as it found it.
    fn execute(&self, grid: &mut Grid, ctx: &mut StageContext) -> Result<(), PipelineError>;
}

/// Result of a pipeline run, besides the mutated grid.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub layer_weights: Option<LayerWeights>,
}

/// Orchestrates multiple generation stages into a complete session.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    seed: u64,
    mode: AccumulateMode,
}

impl Pipeline {
    /// Creates a new empty pipeline; `seed` drives every stochastic stage.
    pub fn new(seed: u64, mode: AccumulateMode) -> Self {
        Self {
            stages: Vec::new(),
            seed,
            mode,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub(crate) fn push_boxed(&mut self, stage: Box<dyn GenerationStage>) {
        self.stages.push(stage);
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Executes all stages in order on the given grid.
    pub fn run(&self, grid: &mut Grid) -> Result<PipelineOutput, PipelineError> {
        self.run_with_callbacks(grid, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `grid` - The grid to generate into
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        grid: &mut Grid,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<PipelineOutput, PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut ctx = StageContext {
            rng: seeded(self.seed),
            mode: self.mode,
            layer_weights: None,
        };

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);
            debug!(stage = stage.name(), id = stage.id().name(), index = i, total, "stage start");

            stage.execute(grid, &mut ctx)?;

            on_stage_complete(stage.name(), i, total);
        }

        Ok(PipelineOutput {
            layer_weights: ctx.layer_weights,
        })
    }
}

fn stage_failed(stage: &dyn GenerationStage) -> impl FnOnce(TerrainError) -> PipelineError + '_ {
    move |source| PipelineError::StageFailed {
        stage: stage.name().to_string(),
        source,
    }
}

/// A height synthesizer run with the pipeline's accumulate mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesizer {
    Reset,
    RandomJitter { lo: f32, hi: f32 },
    Perlin(NoiseParams),
    PerlinMulti { layers: Vec<NoiseParams> },
    Voronoi(VoronoiParams),
    Midpoint(MidpointParams),
}

impl Synthesizer {
    pub fn name(&self) -> &'static str {
        match self {
            Synthesizer::Reset => "reset",
            Synthesizer::RandomJitter { .. } => "random_jitter",
            Synthesizer::Perlin(_) => "perlin",
            Synthesizer::PerlinMulti { .. } => "perlin_multi",
            Synthesizer::Voronoi(_) => "voronoi",
            Synthesizer::Midpoint(_) => "midpoint",
        }
    }
}

/// Height synthesis stage.
pub struct SynthesisStage {
    pub synthesizer: Synthesizer,
}

impl GenerationStage for SynthesisStage {
    fn id(&self) -> StageId {
        StageId::Synthesis
    }

    fn name(&self) -> &str {
        self.synthesizer.name()
    }

    fn execute(&self, grid: &mut Grid, ctx: &mut StageContext) -> Result<(), PipelineError> {
        let mode = ctx.mode;
        let rng = &mut ctx.rng;
        let result = match &self.synthesizer {
            Synthesizer::Reset => {
                reset(grid);
                Ok(())
            }
            Synthesizer::RandomJitter { lo, hi } => random_jitter(grid, *lo, *hi, mode, rng),
            Synthesizer::Perlin(params) => perlin_single(grid, params, mode),
            Synthesizer::PerlinMulti { layers } => perlin_multi(grid, layers, mode),
            Synthesizer::Voronoi(params) => voronoi(grid, params, mode, rng),
            Synthesizer::Midpoint(params) => midpoint_displacement(grid, params, mode, rng),
        };
        result.map_err(stage_failed(self))
    }
}

/// Loads heights from a host image.
///
/// Not expressible in a recipe since the image is a host resource.
pub struct ImageStage<I> {
    pub image: I,
    /// Image step per cell on x and z, height gain on y.
    pub scale: Vec3,
}

impl<I: ImageSampler + Send + Sync> GenerationStage for ImageStage<I> {
    fn id(&self) -> StageId {
        StageId::Synthesis
    }

    fn name(&self) -> &str {
        "load_from_image"
    }

    fn execute(&self, grid: &mut Grid, ctx: &mut StageContext) -> Result<(), PipelineError> {
        load_from_image(grid, &self.image, self.scale, ctx.mode).map_err(stage_failed(self))
    }
}

/// One erosion kind followed by its smoothing passes.
pub struct ErosionStage {
    pub kind: ErosionKind,
    pub params: ErosionParams,
}

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        self.kind.name()
    }

    fn execute(&self, grid: &mut Grid, ctx: &mut StageContext) -> Result<(), PipelineError> {
        erode(grid, &self.kind, &self.params, &mut ctx.rng).map_err(stage_failed(self))
    }
}

/// Standalone box blur.
pub struct SmoothStage {
    pub iterations: u32,
}

impl GenerationStage for SmoothStage {
    fn id(&self) -> StageId {
        StageId::Smooth
    }

    fn name(&self) -> &str {
        "smooth"
    }

    fn execute(&self, grid: &mut Grid, _ctx: &mut StageContext) -> Result<(), PipelineError> {
        smooth(grid, self.iterations);
        Ok(())
    }
}

/// Parameters of a classify stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub rules: Vec<LayerRule>,
    /// Horizontal world size the grid spans, for slope.
    pub terrain_size: f32,
    /// World height of a grid value of 1.0, for slope.
    pub height_scale: f32,
    pub policy: DegeneratePolicy,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            terrain_size: 1000.0,
            height_scale: 600.0,
            policy: DegeneratePolicy::Zero,
        }
    }
}

/// Derives layer weights from the current grid using its own slope.
pub struct ClassifyStage {
    pub config: ClassifyConfig,
}

impl GenerationStage for ClassifyStage {
    fn id(&self) -> StageId {
        StageId::Classify
    }

    fn name(&self) -> &str {
        "classify"
    }

    fn execute(&self, grid: &mut Grid, ctx: &mut StageContext) -> Result<(), PipelineError> {
        let slope = GridSlope::new(grid, self.config.terrain_size, self.config.height_scale);
        let weights = classify(grid, &slope, &self.config.rules, self.config.policy).map_err(stage_failed(self))?;
        ctx.layer_weights = Some(weights);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::VoronoiVariant;
    use image::GrayImage;

    fn grid(side: usize) -> Grid {
        Grid::new(side, side).unwrap()
    }

    #[test]
    fn test_stage_id_name() {
        assert_eq!(StageId::Synthesis.name(), "synthesis");
        assert_eq!(StageId::Classify.name(), "classify");
    }

    #[test]
    fn test_pipeline_execution() {
        let mut pipeline = Pipeline::new(42, AccumulateMode::Accumulate);
        pipeline
            .add_stage(SynthesisStage {
                synthesizer: Synthesizer::Midpoint(MidpointParams::default()),
            })
            .add_stage(SynthesisStage {
                synthesizer: Synthesizer::Voronoi(VoronoiParams {
                    variant: VoronoiVariant::Combined,
                    ..Default::default()
                }),
            })
            .add_stage(ErosionStage {
                kind: ErosionKind::Thermal,
                params: ErosionParams::default(),
            });
        assert_eq!(pipeline.stage_count(), 3);

        let mut heights = grid(33);
        let output = pipeline.run(&mut heights).unwrap();
        let (min, max) = heights.height_range();
        assert!(min < max, "Heightmap should have variation");
        assert!(output.layer_weights.is_none());
    }

    #[test]
    fn test_same_seed_same_grid() {
        let build = || {
            let mut pipeline = Pipeline::new(9, AccumulateMode::Accumulate);
            pipeline
                .add_stage(SynthesisStage {
                    synthesizer: Synthesizer::RandomJitter { lo: 0.0, hi: 0.1 },
                })
                .add_stage(ErosionStage {
                    kind: ErosionKind::River,
                    params: ErosionParams::default(),
                });
            pipeline
        };
        let mut a = grid(16);
        let mut b = grid(16);
        build().run(&mut a).unwrap();
        build().run(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipeline_with_callbacks() {
        let mut pipeline = Pipeline::new(1, AccumulateMode::Overwrite);
        pipeline
            .add_stage(SynthesisStage {
                synthesizer: Synthesizer::Perlin(NoiseParams::default()),
            })
            .add_stage(SmoothStage { iterations: 1 });

        let mut heights = grid(8);
        let mut started = Vec::new();
        let mut completed = 0;
        pipeline
            .run_with_callbacks(
                &mut heights,
                |name, i, total| {
                    started.push(name.to_string());
                    assert!(i < total);
                },
                |_, _, _| completed += 1,
            )
            .unwrap();
        assert_eq!(started, vec!["perlin".to_string(), "smooth".to_string()]);
        assert_eq!(completed, 2);
    }

    #[test]
    fn test_failed_stage_names_itself() {
        let mut pipeline = Pipeline::new(1, AccumulateMode::Overwrite);
        pipeline.add_stage(SynthesisStage {
            synthesizer: Synthesizer::Midpoint(MidpointParams::default()),
        });
        // 10x10 is not 2^n + 1.
        let mut heights = grid(10);
        match pipeline.run(&mut heights) {
            Err(PipelineError::StageFailed { stage, source }) => {
                assert_eq!(stage, "midpoint");
                assert!(matches!(source, TerrainError::InvalidParameter { .. }));
            }
            other => panic!("expected stage failure, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_stage_reports_weights() {
        let mut pipeline = Pipeline::new(5, AccumulateMode::Overwrite);
        pipeline.add_stage(ClassifyStage {
            config: ClassifyConfig {
                rules: vec![LayerRule {
                    height_min: -1.0,
                    height_max: 1.0,
                    slope_min: 0.0,
                    slope_max: 90.0,
                    ..Default::default()
                }],
                ..Default::default()
            },
        });
        let mut heights = grid(6);
        let output = pipeline.run(&mut heights).unwrap();
        let weights = output.layer_weights.unwrap();
        assert_eq!(weights.layer_count(), 1);
        assert!(weights.as_slice().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_image_stage_loads_heights() {
        let image = GrayImage::from_pixel(8, 8, image::Luma([255u8]));
        let mut pipeline = Pipeline::new(0, AccumulateMode::Overwrite);
        pipeline.add_stage(ImageStage {
            image,
            scale: Vec3::new(1.0, 0.5, 1.0),
        });
        let mut heights = grid(8);
        pipeline.run(&mut heights).unwrap();
        assert!(heights.heights().iter().all(|&h| (h - 0.5).abs() < 1e-6));
    }
}
