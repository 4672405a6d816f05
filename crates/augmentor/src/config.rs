// PipelineConfig — declarative pipeline description
//
// A pipeline can be described in JSON and compiled into a `Pipeline`:
//
//   {
//     "seed": 42,
//     "steps": [
//       { "op": "resize", "lower": [200, 200], "upper": [300, 300] },
//       { "op": "flip", "axis": "Horizontal", "probability": 0.5 },
//       { "op": "blur", "sigma": 1.2, "kernel_size": 5, "seed": 7 }
//     ]
//   }
//
// Sizes are `[height, width]`. `probability` defaults to 1 and a per-step
// `seed` overrides the one derived from the top-level seed.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::augment::{BoxBlur, GaussianBlur, Invert, RandomErase};
use crate::buffer::Size;
use crate::error::Result;
use crate::geometry::{Crop, CropPosition, Flip, FlipAxis, Resize, Rotate, Zoom};
use crate::pipeline::Pipeline;
use crate::transform::{Operation, Transform, ALWAYS};

fn always() -> f64 {
    ALWAYS
}

fn default_passes() -> usize {
    3
}

fn default_position() -> CropPosition {
    CropPosition::Center
}

/// One step of a [`PipelineConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(flatten)]
    pub op: OpConfig,
    #[serde(default = "always")]
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// The transform of a [`StepConfig`] and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpConfig {
    Resize {
        lower: (usize, usize),
        upper: (usize, usize),
    },
    Crop {
        size: (usize, usize),
        #[serde(default = "default_position")]
        position: CropPosition,
    },
    Zoom {
        min_factor: f64,
        max_factor: f64,
    },
    Rotate {
        min_degree: f64,
        max_degree: f64,
    },
    Invert,
    Flip {
        axis: String,
    },
    Blur {
        sigma: f64,
        #[serde(default)]
        kernel_size: Option<usize>,
    },
    RapidBlur {
        sigma: f64,
        #[serde(default = "default_passes")]
        passes: usize,
    },
    RandomErase {
        lower: (usize, usize),
        upper: (usize, usize),
    },
}

impl OpConfig {
    /// Validate parameters and build the transform.
    pub fn build(&self) -> Result<Box<dyn Transform>> {
        let transform: Box<dyn Transform> = match self {
            OpConfig::Resize { lower, upper } => {
                Box::new(Resize::new(Size::from(*lower), Size::from(*upper))?)
            }
            OpConfig::Crop { size, position } => Box::new(Crop::new(Size::from(*size), *position)?),
            OpConfig::Zoom {
                min_factor,
                max_factor,
            } => Box::new(Zoom::new(*min_factor, *max_factor)?),
            OpConfig::Rotate {
                min_degree,
                max_degree,
            } => Box::new(Rotate::new(*min_degree, *max_degree)?),
            OpConfig::Invert => Box::new(Invert),
            OpConfig::Flip { axis } => Box::new(Flip::new(axis.parse::<FlipAxis>()?)),
            OpConfig::Blur { sigma, kernel_size } => match kernel_size {
                Some(n) => Box::new(GaussianBlur::with_kernel_size(*sigma, *n)?),
                None => Box::new(GaussianBlur::new(*sigma)?),
            },
            OpConfig::RapidBlur { sigma, passes } => Box::new(BoxBlur::new(*sigma, *passes)?),
            OpConfig::RandomErase { lower, upper } => {
                Box::new(RandomErase::new(Size::from(*lower), Size::from(*upper))?)
            }
        };
        Ok(transform)
    }
}

/// A serializable description of a whole pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base seed (0 or absent = time-derived).
    #[serde(default)]
    pub seed: u64,
    pub steps: Vec<StepConfig>,
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Compile into a [`Pipeline`]. The first invalid step fails the build.
    pub fn build(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::seeded(self.seed);
        for step in &self.steps {
            let transform = step.op.build()?;
            pipeline = match step.seed {
                Some(seed) => pipeline.push(
                    Operation::from_boxed(transform)
                        .with_probability(step.probability)?
                        .with_seed(seed),
                ),
                None => pipeline.then_boxed(transform, step.probability)?,
            };
        }
        Ok(pipeline)
    }
}
