//! # augmentor
//!
//! Randomized image augmentation for generating synthetic training data.
//!
//! This crate provides:
//! - [`PixelBuffer`] — 8-bit interleaved image grid
//! - [`Transform`] trait and [`Operation`] — a transform behind a probability gate
//! - [`Pipeline`] — fluent, ordered chain of operations
//! - [`Augmentor`] — samples N outputs from a candidate list through a pipeline
//   - Geometric transforms — Resize, Crop, Zoom, Rotate, Flip
//   - Photometric transforms — Invert, GaussianBlur, BoxBlur, RandomErase
//   - Kernel builder for separable convolution (Gaussian, box, pseudo-Gaussian)
//   - ImageFolder candidate scanning and the ImageCodec load/save seam
//   - JSON pipeline descriptions (PipelineConfig)

pub mod augment;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod image_folder;
pub mod kernel;
pub mod pipeline;
pub mod rng;
pub mod sampler;
pub mod transform;

pub use augment::{BoxBlur, GaussianBlur, Invert, RandomErase};
pub use buffer::{PixelBuffer, Size};
pub use codec::{ImageCodec, MemoryCodec, DEFAULT_QUALITY};
pub use config::{OpConfig, PipelineConfig, StepConfig};
pub use error::{Error, Result};
pub use geometry::{Crop, CropPosition, Flip, FlipAxis, Resize, Rotate, Zoom};
pub use image_folder::{ImageFolder, ImageFolderBuilder};
pub use kernel::Kernel;
pub use pipeline::Pipeline;
pub use rng::UniformSource;
pub use sampler::{Augmentor, SampleRecord, SamplerConfig};
pub use transform::{Operation, Transform};

#[cfg(feature = "file-codec")]
pub use codec::FileCodec;
