// Kernel — normalized 1-D convolution kernels for separable blurs

use std::ops::Index;

use crate::bail;
use crate::error::Result;

/// Largest kernel any constructor will build.
pub const MAX_KERNEL_SIZE: usize = (1 << 20) + 1;

/// An odd-length 1-D convolution kernel whose weights sum to 1.
///
/// The center tap sits at `len() / 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
}

impl Kernel {
    /// Gaussian kernel: `w[i] = exp(-(i - n/2)^2 / sigma^2)`, normalized.
    ///
    /// Fails when `sigma` is not a positive finite number or `size` is not odd.
    pub fn gaussian(sigma: f64, size: usize) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            bail!("gaussian kernel sigma must be positive, got {sigma}");
        }
        check_odd(size)?;

        let base = -1.0 / (sigma * sigma);
        let half = (size / 2) as i64;
        let weights = (0..size as i64)
            .map(|i| {
                let x = (i - half) as f64;
                (x * x * base).exp()
            })
            .collect();
        Ok(Self::normalized(weights))
    }

    /// Gaussian kernel sized from `sigma`: `2 * ceil(3 * sigma) + 1` taps.
    pub fn gaussian_for_sigma(sigma: f64) -> Result<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            bail!("gaussian kernel sigma must be positive, got {sigma}");
        }
        let half = (3.0 * sigma).ceil();
        if half > (MAX_KERNEL_SIZE / 2) as f64 {
            bail!("gaussian sigma {sigma} needs a kernel larger than {MAX_KERNEL_SIZE} taps");
        }
        Self::gaussian(sigma, 2 * half as usize + 1)
    }

    /// Box (mean) kernel with `size` equal taps.
    pub fn box_filter(size: usize) -> Result<Self> {
        check_odd(size)?;
        Ok(Self {
            weights: vec![1.0 / size as f64; size],
        })
    }

    /// Box kernels whose successive application approximates a Gaussian of
    /// the given `sigma`.
    ///
    /// See Kovesi, "Fast almost-Gaussian filtering" and Gwosdek et al.,
    /// "Theoretical foundations of Gaussian convolution by extended box
    /// filtering".
    pub fn pseudo_gaussian(sigma: f64, passes: usize) -> Result<Vec<Self>> {
        if !(sigma.is_finite() && sigma > 0.0) {
            bail!("box blur sigma must be positive, got {sigma}");
        }
        if passes == 0 {
            bail!("box blur needs at least one pass");
        }
        let n = passes as f64;
        let sigma2 = sigma * sigma;
        let w_ideal = (12.0 * sigma2 / n + 1.0).sqrt();
        if w_ideal + 2.0 > MAX_KERNEL_SIZE as f64 {
            bail!("box blur sigma {sigma} needs a kernel larger than {MAX_KERNEL_SIZE} taps");
        }
        let mut wl = w_ideal.floor() as usize;
        if wl % 2 == 0 {
            wl -= 1;
        }
        let wu = wl + 2;
        let wlf = wl as f64;
        let m_ideal = (12.0 * sigma2 - n * wlf * wlf - 4.0 * n * wlf - 3.0 * n) / (-4.0 * wlf - 4.0);
        let m = m_ideal.round().max(0.0) as usize;

        (0..passes)
            .map(|i| Self::box_filter(if i < m { wl } else { wu }))
            .collect()
    }

    fn normalized(mut weights: Vec<f64>) -> Self {
        let norm: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= norm;
        }
        Self { weights }
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Kernels are never empty; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Distance from the center tap to either end.
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Index<usize> for Kernel {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.weights[i]
    }
}

fn check_odd(size: usize) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        bail!("kernel size must be odd and non-zero, got {size}");
    }
    if size > MAX_KERNEL_SIZE {
        bail!("kernel size {size} exceeds {MAX_KERNEL_SIZE}");
    }
    Ok(())
}
