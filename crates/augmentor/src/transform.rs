// Transform — a single pixel-level augmentation, and its probability gate

use tracing::debug;

use crate::bail;
use crate::buffer::PixelBuffer;
use crate::error::Result;
use crate::rng::{UniformSource, TIME_SEED};

/// A transform applied to one buffer.
///
/// Transforms hold only immutable configuration; every random parameter is
/// drawn from the `rng` handed in by the owning [`Operation`]. A transform
/// takes the buffer by value and returns the buffer the next stage should
/// see, which may be the same allocation mutated in place or a new one.
pub trait Transform: Send + Sync {
    /// Apply the transform.
    fn apply(&self, image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer>;

    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;
}

/// Probability that always executes.
pub const ALWAYS: f64 = 1.0;

/// One pipeline step: a transform, its execution probability and the
/// generator that drives both the gate and the transform's parameters.
pub struct Operation {
    transform: Box<dyn Transform>,
    probability: f64,
    rng: UniformSource,
}

impl Operation {
    /// Wrap a transform with probability 1 and a time-derived seed.
    pub fn new(transform: impl Transform + 'static) -> Self {
        Self::from_boxed(Box::new(transform))
    }

    pub fn from_boxed(transform: Box<dyn Transform>) -> Self {
        Self {
            transform,
            probability: ALWAYS,
            rng: UniformSource::new(TIME_SEED),
        }
    }

    /// Set the execution probability. Must lie in `[0, 1]`.
    pub fn with_probability(mut self, probability: f64) -> Result<Self> {
        self.probability = check_probability(probability)?;
        Ok(self)
    }

    /// Reseed the generator. `0` keeps the time-derived behaviour.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = UniformSource::new(seed);
        self
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn name(&self) -> &str {
        self.transform.name()
    }

    /// Run the gate, then the transform if the gate passes.
    ///
    /// A skipped transform hands the buffer back unchanged.
    pub fn perform(&mut self, image: PixelBuffer) -> Result<PixelBuffer> {
        let u = self.rng.next_unit();
        if u > self.probability {
            debug!(op = self.transform.name(), u, p = self.probability, "skipped");
            return Ok(image);
        }
        debug!(op = self.transform.name(), u, p = self.probability, "applying");
        self.transform.apply(image, &mut self.rng)
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("transform", &self.transform.name())
            .field("probability", &self.probability)
            .field("seed", &self.rng.seed())
            .finish()
    }
}

pub(crate) fn check_probability(p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        bail!("probability must lie in [0, 1], got {p}");
    }
    Ok(p)
}
