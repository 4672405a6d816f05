// Pipeline — ordered chain of gated operations
//
// Building a pipeline never touches pixels: each configuration call validates
// its parameters, wraps the transform in an `Operation` and appends it.
// `run` feeds one buffer through every operation in order.

use tracing::debug;

use crate::augment::{BoxBlur, GaussianBlur, Invert, RandomErase};
use crate::buffer::{PixelBuffer, Size};
use crate::error::Result;
use crate::geometry::{Crop, CropPosition, Flip, FlipAxis, Resize, Rotate, Zoom};
use crate::rng::TIME_SEED;
use crate::transform::{Operation, Transform};

/// An ordered, owned chain of [`Operation`]s.
///
/// # Examples
/// ```
/// use augmentor::{FlipAxis, Pipeline, Size};
///
/// let pipeline = Pipeline::seeded(7)
///     .resize(Size::new(200, 200), Size::new(300, 300), 1.0)?
///     .flip(FlipAxis::Horizontal, 0.5)?
///     .blur(1.5, 0.25)?;
/// assert_eq!(pipeline.len(), 3);
/// # Ok::<(), augmentor::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Pipeline {
    operations: Vec<Operation>,
    /// Base seed for operations added through the fluent methods; `0` means
    /// every operation seeds itself from the clock.
    seed: u64,
}

impl Pipeline {
    /// An empty pipeline whose operations draw time-derived seeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty pipeline whose operations are reproducible: the i-th
    /// operation added via a fluent method is seeded with `seed + i`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            operations: Vec::new(),
            seed,
        }
    }

    /// Append a fully configured operation (custom probability and seed).
    pub fn push(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Append any transform with the given probability, seeded from the
    /// pipeline's base seed.
    pub fn then(self, transform: impl Transform + 'static, probability: f64) -> Result<Self> {
        self.then_boxed(Box::new(transform), probability)
    }

    pub fn then_boxed(self, transform: Box<dyn Transform>, probability: f64) -> Result<Self> {
        let seed = self.next_seed();
        let op = Operation::from_boxed(transform)
            .with_probability(probability)?
            .with_seed(seed);
        Ok(self.push(op))
    }

    /// Reseed the most recently added operation.
    ///
    /// `Pipeline::new().rotate(-10.0, 10.0, 0.5)?.seed(7)` makes that
    /// rotation reproducible without touching the other operations. On an
    /// empty pipeline this does nothing.
    pub fn seed(mut self, seed: u64) -> Self {
        if let Some(op) = self.operations.pop() {
            self.operations.push(op.with_seed(seed));
        }
        self
    }

    fn next_seed(&self) -> u64 {
        if self.seed == TIME_SEED {
            return TIME_SEED;
        }
        match self.seed.wrapping_add(self.operations.len() as u64) {
            TIME_SEED => 1,
            s => s,
        }
    }

    /// Resize to a size drawn from `[lower, upper]`.
    pub fn resize(self, lower: Size, upper: Size, probability: f64) -> Result<Self> {
        self.then(Resize::new(lower, upper)?, probability)
    }

    /// Resize to exactly `size`.
    pub fn resize_to(self, size: Size, probability: f64) -> Result<Self> {
        self.then(Resize::exact(size)?, probability)
    }

    /// Crop a `size` window, centered or at a random position.
    pub fn crop(self, size: Size, center: bool, probability: f64) -> Result<Self> {
        let position = if center {
            CropPosition::Center
        } else {
            CropPosition::Random
        };
        self.then(Crop::new(size, position)?, probability)
    }

    /// Zoom by a factor in `[min_factor, max_factor]`.
    pub fn zoom(self, min_factor: f64, max_factor: f64, probability: f64) -> Result<Self> {
        self.then(Zoom::new(min_factor, max_factor)?, probability)
    }

    /// Rotate by an angle in `[min_degree, max_degree]`.
    pub fn rotate(self, min_degree: f64, max_degree: f64, probability: f64) -> Result<Self> {
        self.then(Rotate::new(min_degree, max_degree)?, probability)
    }

    /// Invert every channel.
    pub fn invert(self, probability: f64) -> Result<Self> {
        self.then(Invert, probability)
    }

    /// Mirror along `axis`.
    pub fn flip(self, axis: FlipAxis, probability: f64) -> Result<Self> {
        self.then(Flip::new(axis), probability)
    }

    /// Gaussian blur with a kernel sized from `sigma`.
    pub fn blur(self, sigma: f64, probability: f64) -> Result<Self> {
        self.then(GaussianBlur::new(sigma)?, probability)
    }

    /// Gaussian blur with an explicit odd kernel size.
    pub fn blur_with_kernel(self, sigma: f64, kernel_size: usize, probability: f64) -> Result<Self> {
        self.then(GaussianBlur::with_kernel_size(sigma, kernel_size)?, probability)
    }

    /// Approximate Gaussian blur from `passes` box blurs.
    pub fn rapid_blur(self, sigma: f64, passes: usize, probability: f64) -> Result<Self> {
        self.then(BoxBlur::new(sigma, passes)?, probability)
    }

    /// Erase a noise rectangle sized in `[lower_mask, upper_mask]`.
    pub fn random_erase(self, lower_mask: Size, upper_mask: Size, probability: f64) -> Result<Self> {
        self.then(RandomErase::new(lower_mask, upper_mask)?, probability)
    }

    /// Erase a noise rectangle of exactly `mask`.
    pub fn random_erase_fixed(self, mask: Size, probability: f64) -> Result<Self> {
        self.then(RandomErase::fixed(mask)?, probability)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Feed `image` through every operation in order.
    ///
    /// Each operation receives the buffer returned by the previous one; the
    /// first error aborts the chain.
    pub fn run(&mut self, mut image: PixelBuffer) -> Result<PixelBuffer> {
        for (i, op) in self.operations.iter_mut().enumerate() {
            image = op.perform(image)?;
            debug!(
                step = i,
                op = op.name(),
                height = image.height(),
                width = image.width(),
                "step done"
            );
        }
        Ok(image)
    }
}
