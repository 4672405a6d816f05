// Photometric augmentations — invert, blur, random erase
//
// All augmentations operate on `PixelBuffer` in [H, W, C] layout and keep
// the buffer dimensions unchanged.

use crate::buffer::{PixelBuffer, Size};
use crate::error::Result;
use crate::geometry::check_range;
use crate::kernel::Kernel;
use crate::rng::UniformSource;
use crate::transform::Transform;

// Invert

/// Replace every channel byte `v` with `!v` (`255 - v`).
#[derive(Debug, Clone, Default)]
pub struct Invert;

impl Transform for Invert {
    fn apply(&self, mut image: PixelBuffer, _rng: &mut UniformSource) -> Result<PixelBuffer> {
        for v in image.as_raw_mut() {
            *v = !*v;
        }
        Ok(image)
    }

    fn name(&self) -> &str {
        "invert"
    }
}

// Separable convolution

/// Convolve `image` with `kernel` along the height axis, then the width axis.
///
/// Samples outside the buffer clamp to the nearest edge pixel. Channels are
/// filtered independently; accumulation runs in `f64` and the result is
/// truncated back to `u8` once both passes are done.
pub fn convolve_separable(image: &PixelBuffer, kernel: &Kernel) -> Result<PixelBuffer> {
    let (w, h, c) = (image.width(), image.height(), image.channels());
    let r = kernel.radius() as i64;
    let src = image.as_raw();

    // Vertical pass into an f64 plane.
    let mut plane = vec![0.0f64; src.len()];
    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                let mut acc = 0.0;
                for (k, weight) in kernel.weights().iter().enumerate() {
                    let sy = clamp_index(y as i64 + k as i64 - r, h);
                    acc += weight * src[(sy * w + x) * c + ch] as f64;
                }
                plane[(y * w + x) * c + ch] = acc;
            }
        }
    }

    // Horizontal pass into the output buffer.
    let mut out = PixelBuffer::new(w, h, c)?;
    let dst = out.as_raw_mut();
    for y in 0..h {
        for x in 0..w {
            for ch in 0..c {
                let mut acc = 0.0;
                for (k, weight) in kernel.weights().iter().enumerate() {
                    let sx = clamp_index(x as i64 + k as i64 - r, w);
                    acc += weight * plane[(y * w + sx) * c + ch];
                }
                dst[(y * w + x) * c + ch] = truncate(acc);
            }
        }
    }
    Ok(out)
}

#[inline]
fn clamp_index(i: i64, len: usize) -> usize {
    i.clamp(0, len as i64 - 1) as usize
}

// Weights sum to 1, but rounding can land a hair above 255 or below 0; the
// small epsilon keeps constant regions from truncating 200 to 199.
#[inline]
fn truncate(v: f64) -> u8 {
    (v + 1e-9).clamp(0.0, 255.0) as u8
}

// GaussianBlur

/// Separable Gaussian blur.
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    kernel: Kernel,
}

impl GaussianBlur {
    /// Kernel size derived from `sigma` (see [`Kernel::gaussian_for_sigma`]).
    pub fn new(sigma: f64) -> Result<Self> {
        Ok(Self {
            kernel: Kernel::gaussian_for_sigma(sigma)?,
        })
    }

    /// Explicit odd kernel size.
    pub fn with_kernel_size(sigma: f64, kernel_size: usize) -> Result<Self> {
        Ok(Self {
            kernel: Kernel::gaussian(sigma, kernel_size)?,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

impl Transform for GaussianBlur {
    fn apply(&self, image: PixelBuffer, _rng: &mut UniformSource) -> Result<PixelBuffer> {
        convolve_separable(&image, &self.kernel)
    }

    fn name(&self) -> &str {
        "gaussian_blur"
    }
}

// BoxBlur

/// Repeated box blur approximating a Gaussian; cheaper than [`GaussianBlur`]
/// for large sigmas.
#[derive(Debug, Clone)]
pub struct BoxBlur {
    kernels: Vec<Kernel>,
}

impl BoxBlur {
    pub fn new(sigma: f64, passes: usize) -> Result<Self> {
        Ok(Self {
            kernels: Kernel::pseudo_gaussian(sigma, passes)?,
        })
    }

    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }
}

impl Transform for BoxBlur {
    fn apply(&self, mut image: PixelBuffer, _rng: &mut UniformSource) -> Result<PixelBuffer> {
        for kernel in &self.kernels {
            image = convolve_separable(&image, kernel)?;
        }
        Ok(image)
    }

    fn name(&self) -> &str {
        "box_blur"
    }
}

// RandomErase — overwrite a random rectangle with noise (cutout)

/// Erase a rectangle whose size is drawn from `[lower, upper]` (one factor
/// for both axes, bounds clamped to the image) at a uniformly random
/// position, filling it with per-channel uniform noise.
#[derive(Debug, Clone)]
pub struct RandomErase {
    pub lower: Size,
    pub upper: Size,
}

impl RandomErase {
    pub fn new(lower: Size, upper: Size) -> Result<Self> {
        check_range(lower, upper)?;
        Ok(Self { lower, upper })
    }

    /// Always erase a `mask` sized rectangle.
    pub fn fixed(mask: Size) -> Result<Self> {
        Self::new(mask, mask)
    }
}

impl Transform for RandomErase {
    fn apply(&self, mut image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer> {
        let bounds = image.size();
        let lower = self.lower.min(bounds);
        let upper = self.upper.min(bounds);

        let f = rng.next_unit();
        let mask = Size::lerp(lower, upper, f);
        if mask.is_empty() {
            return Ok(image);
        }

        let left = rng.next_index(0..=bounds.width - mask.width);
        let top = rng.next_index(0..=bounds.height - mask.height);

        let (w, c) = (image.width(), image.channels());
        let data = image.as_raw_mut();
        for row in top..top + mask.height {
            let start = (row * w + left) * c;
            for v in &mut data[start..start + mask.width * c] {
                *v = rng.next_byte();
            }
        }
        Ok(image)
    }

    fn name(&self) -> &str {
        "random_erase"
    }
}

// Tests
