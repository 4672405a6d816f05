// Geometric transforms — resize, crop, zoom, rotate, flip
//
// All of these operate on `PixelBuffer` in [H, W, C] layout. Transforms that
// change dimensions return a freshly allocated buffer; flip works in place.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bail;
use crate::buffer::{PixelBuffer, Size};
use crate::error::{Error, Result};
use crate::rng::UniformSource;
use crate::transform::Transform;

// Resize

/// Resize to a size drawn from `[lower, upper]`.
///
/// Height and width share one random factor, so the aspect ratio moves
/// along the line between the two bounds rather than anywhere in the box.
#[derive(Debug, Clone)]
pub struct Resize {
    pub lower: Size,
    pub upper: Size,
}

impl Resize {
    pub fn new(lower: Size, upper: Size) -> Result<Self> {
        if lower.is_empty() {
            bail!("resize lower bound must be non-zero, got {lower}");
        }
        check_range(lower, upper)?;
        Ok(Self { lower, upper })
    }

    /// Resize to exactly `size`.
    pub fn exact(size: Size) -> Result<Self> {
        Self::new(size, size)
    }
}

impl Transform for Resize {
    fn apply(&self, image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer> {
        let f = rng.next_unit();
        let target = Size::lerp(self.lower, self.upper, f);
        image.resize(target.height, target.width)
    }

    fn name(&self) -> &str {
        "resize"
    }
}

// Crop

/// Where a [`Crop`] takes its window from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropPosition {
    /// Window centered on the image center.
    Center,
    /// Top-left corner drawn uniformly among positions where the window fits.
    Random,
}

/// Crop a fixed-size window.
#[derive(Debug, Clone)]
pub struct Crop {
    pub size: Size,
    pub position: CropPosition,
}

impl Crop {
    pub fn new(size: Size, position: CropPosition) -> Result<Self> {
        if size.is_empty() {
            bail!("crop size must be non-zero, got {size}");
        }
        Ok(Self { size, position })
    }

    pub fn center(size: Size) -> Result<Self> {
        Self::new(size, CropPosition::Center)
    }
}

/// Copy the window of `size` centered on the buffer center.
///
/// Offsets use integer halves: `left = W/2 - w/2`, `top = H/2 - h/2`.
pub fn center_crop(image: &PixelBuffer, size: Size) -> Result<PixelBuffer> {
    let left = (image.width() / 2) as i64 - (size.width / 2) as i64;
    let top = (image.height() / 2) as i64 - (size.height / 2) as i64;
    image.region(left, top, size)
}

impl Transform for Crop {
    fn apply(&self, image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer> {
        match self.position {
            CropPosition::Center => center_crop(&image, self.size),
            CropPosition::Random => {
                if !self.size.fits_within(image.size()) {
                    return Err(Error::out_of_bounds(
                        0,
                        0,
                        self.size.width,
                        self.size.height,
                        image.width(),
                        image.height(),
                    ));
                }
                let left = rng.next_index(0..=image.width() - self.size.width);
                let top = rng.next_index(0..=image.height() - self.size.height);
                image.region(left as i64, top as i64, self.size)
            }
        }
    }

    fn name(&self) -> &str {
        "crop"
    }
}

// Zoom

/// Scale by a factor drawn from `[min_factor, max_factor]` (truncated to one
/// decimal), then center-crop back to the original dimensions.
///
/// Factors below 1 shrink the image under the crop window and fail with
/// [`Error::OutOfBounds`].
#[derive(Debug, Clone)]
pub struct Zoom {
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Zoom {
    pub fn new(min_factor: f64, max_factor: f64) -> Result<Self> {
        if !(min_factor.is_finite() && max_factor.is_finite() && min_factor > 0.0) {
            bail!("zoom factors must be positive and finite, got [{min_factor}, {max_factor}]");
        }
        if min_factor > max_factor {
            bail!("zoom range inverted: [{min_factor}, {max_factor}]");
        }
        Ok(Self {
            min_factor,
            max_factor,
        })
    }
}

impl Transform for Zoom {
    fn apply(&self, image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer> {
        let z = rng.next_between(self.min_factor, self.max_factor);
        let z = (z * 10.0).trunc() / 10.0;

        let original = image.size();
        let new_h = (original.height as f64 * z) as usize;
        let new_w = (original.width as f64 * z) as usize;
        if new_h == 0 || new_w == 0 {
            return Err(Error::out_of_bounds(
                0,
                0,
                original.width,
                original.height,
                new_w,
                new_h,
            ));
        }
        let zoomed = image.resize(new_h, new_w)?;
        center_crop(&zoomed, original)
    }

    fn name(&self) -> &str {
        "zoom"
    }
}

// Rotate

/// Rotate about the image center by an angle drawn from
/// `[min_degree, max_degree]`.
///
/// Output keeps the source dimensions; destination pixels whose inverse
/// mapping lands outside the source stay black.
#[derive(Debug, Clone)]
pub struct Rotate {
    pub min_degree: f64,
    pub max_degree: f64,
}

impl Rotate {
    pub fn new(min_degree: f64, max_degree: f64) -> Result<Self> {
        if !(min_degree.is_finite() && max_degree.is_finite()) {
            bail!("rotation bounds must be finite, got [{min_degree}, {max_degree}]");
        }
        if min_degree > max_degree {
            bail!("rotation range inverted: [{min_degree}, {max_degree}]");
        }
        Ok(Self {
            min_degree,
            max_degree,
        })
    }
}

/// Inverse-map rotation by `degrees` with nearest-neighbour sampling.
pub fn rotate(image: &PixelBuffer, degrees: f64) -> Result<PixelBuffer> {
    let (w, h, c) = (image.width(), image.height(), image.channels());
    let mut out = PixelBuffer::new(w, h, c)?;
    let (sin, cos) = degrees.to_radians().sin_cos();
    let cx = (w / 2) as f64;
    let cy = (h / 2) as f64;

    let src = image.as_raw();
    let dst = out.as_raw_mut();
    for y in 0..h {
        let dy = y as f64 - cy;
        for x in 0..w {
            let dx = x as f64 - cx;
            let xs = (cos * dx + sin * dy + cx).round();
            let ys = (-sin * dx + cos * dy + cy).round();
            if xs < 0.0 || ys < 0.0 || xs >= w as f64 || ys >= h as f64 {
                continue;
            }
            let s = (ys as usize * w + xs as usize) * c;
            let d = (y * w + x) * c;
            dst[d..d + c].copy_from_slice(&src[s..s + c]);
        }
    }
    Ok(out)
}

impl Transform for Rotate {
    fn apply(&self, image: PixelBuffer, rng: &mut UniformSource) -> Result<PixelBuffer> {
        let degrees = rng.next_between(self.min_degree, self.max_degree);
        rotate(&image, degrees)
    }

    fn name(&self) -> &str {
        "rotate"
    }
}

// Flip

/// Mirror axis for [`Flip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Mirror across the vertical centerline (columns swap).
    Horizontal,
    /// Mirror across the horizontal centerline (rows swap).
    Vertical,
}

impl FromStr for FlipAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" => Ok(FlipAxis::Horizontal),
            "vertical" => Ok(FlipAxis::Vertical),
            _ => Err(Error::config(format!(
                "flip axis must be \"Horizontal\" or \"Vertical\", got {s:?}"
            ))),
        }
    }
}

/// Mirror the image along one axis, in place.
#[derive(Debug, Clone)]
pub struct Flip {
    pub axis: FlipAxis,
}

impl Flip {
    pub fn new(axis: FlipAxis) -> Self {
        Self { axis }
    }
}

/// Mirror `image` in place.
pub fn flip(image: &mut PixelBuffer, axis: FlipAxis) {
    let (w, h, c) = (image.width(), image.height(), image.channels());
    let stride = w * c;
    let data = image.as_raw_mut();
    match axis {
        FlipAxis::Horizontal => {
            for row in data.chunks_exact_mut(stride) {
                for x in 0..w / 2 {
                    let mirror = w - 1 - x;
                    for ch in 0..c {
                        row.swap(x * c + ch, mirror * c + ch);
                    }
                }
            }
        }
        FlipAxis::Vertical => {
            for y in 0..h / 2 {
                let (top, bottom) = data.split_at_mut((h - 1 - y) * stride);
                top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
            }
        }
    }
}

impl Transform for Flip {
    fn apply(&self, mut image: PixelBuffer, _rng: &mut UniformSource) -> Result<PixelBuffer> {
        flip(&mut image, self.axis);
        Ok(image)
    }

    fn name(&self) -> &str {
        "flip"
    }
}

pub(crate) fn check_range(lower: Size, upper: Size) -> Result<()> {
    if !lower.fits_within(upper) {
        bail!("size range inverted: lower {lower} exceeds upper {upper}");
    }
    Ok(())
}

// Tests
