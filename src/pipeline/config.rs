//! Declarative generation recipes.

use serde::{Deserialize, Serialize};

use crate::erosion::{ErosionKind, ErosionParams};
use crate::noise::NoiseParams;
use crate::terrain::{AccumulateMode, MidpointParams, VoronoiParams};
use super::stage::{
    ClassifyConfig, ClassifyStage, ErosionStage, GenerationStage, Pipeline, PipelineError, SmoothStage,
    SynthesisStage, Synthesizer,
};

/// One entry of a recipe, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StageSpec {
    Reset,
    RandomJitter {
        lo: f32,
        hi: f32,
    },
    Perlin(NoiseParams),
    PerlinMulti {
        layers: Vec<NoiseParams>,
    },
    Voronoi(VoronoiParams),
    Midpoint(MidpointParams),
    Erode {
        erosion: ErosionKind,
        #[serde(default)]
        params: ErosionParams,
    },
    Smooth {
        iterations: u32,
    },
    Classify(ClassifyConfig),
}

impl StageSpec {
    fn into_stage(self) -> Box<dyn GenerationStage> {
        let synthesis = |synthesizer| -> Box<dyn GenerationStage> { Box::new(SynthesisStage { synthesizer }) };
        match self {
            StageSpec::Reset => synthesis(Synthesizer::Reset),
            StageSpec::RandomJitter { lo, hi } => synthesis(Synthesizer::RandomJitter { lo, hi }),
            StageSpec::Perlin(params) => synthesis(Synthesizer::Perlin(params)),
            StageSpec::PerlinMulti { layers } => synthesis(Synthesizer::PerlinMulti { layers }),
            StageSpec::Voronoi(params) => synthesis(Synthesizer::Voronoi(params)),
            StageSpec::Midpoint(params) => synthesis(Synthesizer::Midpoint(params)),
            StageSpec::Erode { erosion, params } => Box::new(ErosionStage { kind: erosion, params }),
            StageSpec::Smooth { iterations } => Box::new(SmoothStage { iterations }),
            StageSpec::Classify(config) => Box::new(ClassifyStage { config }),
        }
    }
}

/// A complete generation session: seed, accumulate mode and ordered stages.
///
/// ```toml
/// seed = 7
/// mode = "accumulate"
///
/// [[stages]]
/// op = "midpoint"
/// height_min = -0.5
/// height_max = 0.5
///
/// [[stages]]
/// op = "erode"
/// erosion = { type = "thermal" }
/// params = { strength = 0.01, amount = 0.05 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipeConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub mode: AccumulateMode,
    #[serde(default)]
    pub stages: Vec<StageSpec>,
}

impl RecipeConfig {
    /// Parses a recipe from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(source)?)
    }

    /// Builds the stages in recipe order.
    pub fn into_pipeline(self) -> Pipeline {
        let mut pipeline = Pipeline::new(self.seed, self.mode);
        for entry in self.stages {
            pipeline.push_boxed(entry.into_stage());
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DegeneratePolicy;
    use crate::terrain::VoronoiVariant;

    const RECIPE: &str = r#"
seed = 7
mode = "accumulate"

[[stages]]
op = "reset"

[[stages]]
op = "voronoi"
peak_count = 3
variant = "power_sin"
drop_off = 2.0

[[stages]]
op = "perlin_multi"
layers = [
    { x_scale = 0.02, y_scale = 0.02, octaves = 4, persistence = 0.5, height_scale = 0.2 },
    { octaves = 2 },
]

[[stages]]
op = "erode"
erosion = { type = "wind", direction_deg = 30.0 }

[[stages]]
op = "smooth"
iterations = 2

[[stages]]
op = "classify"
policy = "reject"
rules = [{ name = "all", height_min = -10.0, height_max = 10.0, slope_max = 90.0 }]
"#;

    #[test]
    fn test_parses_every_section() {
        let recipe = RecipeConfig::from_toml_str(RECIPE).unwrap();
        assert_eq!(recipe.seed, 7);
        assert_eq!(recipe.mode, AccumulateMode::Accumulate);
        assert_eq!(recipe.stages.len(), 6);

        match &recipe.stages[1] {
            StageSpec::Voronoi(params) => {
                assert_eq!(params.peak_count, 3);
                assert_eq!(params.variant, VoronoiVariant::PowerSin);
                assert_eq!(params.min_height, VoronoiParams::default().min_height);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &recipe.stages[2] {
            StageSpec::PerlinMulti { layers } => {
                assert_eq!(layers.len(), 2);
                assert_eq!(layers[1].octaves, 2);
                assert_eq!(layers[1].x_scale, NoiseParams::default().x_scale);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &recipe.stages[3] {
            StageSpec::Erode { erosion, params } => {
                assert_eq!(*erosion, ErosionKind::Wind { direction_deg: 30.0 });
                assert_eq!(*params, ErosionParams::default());
            }
            other => panic!("unexpected {other:?}"),
        }
        match &recipe.stages[5] {
            StageSpec::Classify(config) => {
                assert_eq!(config.policy, DegeneratePolicy::Reject);
                assert_eq!(config.rules[0].name, "all");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_builds_pipeline_in_order() {
        let pipeline = RecipeConfig::from_toml_str(RECIPE).unwrap().into_pipeline();
        assert_eq!(pipeline.stage_count(), 6);
        assert_eq!(pipeline.seed(), 7);
    }

    #[test]
    fn test_rejects_unknown_op() {
        let err = RecipeConfig::from_toml_str("[[stages]]\nop = \"terraform\"\n").unwrap_err();
        assert!(matches!(err, PipelineError::Recipe(_)));
    }

    #[test]
    fn test_empty_recipe_is_valid() {
        let recipe = RecipeConfig::from_toml_str("").unwrap();
        assert_eq!(recipe, RecipeConfig::default());
    }
}
