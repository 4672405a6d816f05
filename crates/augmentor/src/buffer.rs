// PixelBuffer — in-memory 8-bit image grid
//
// Layout is row-major interleaved [H, W, C]: the pixel at (x, y) occupies
// bytes `(y * W + x) * C .. + C`. Every row therefore holds exactly W * C
// bytes.

use serde::{Deserialize, Serialize};

use crate::bail;
use crate::error::{Error, Result};

/// A `{ height, width }` pair, the unit of every size range in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub height: usize,
    pub width: usize,
}

impl Size {
    pub const fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Component-wise minimum with another size.
    pub fn min(self, other: Size) -> Size {
        Size::new(self.height.min(other.height), self.width.min(other.width))
    }

    /// `true` when both components are `<=` the other's.
    pub fn fits_within(self, other: Size) -> bool {
        self.height <= other.height && self.width <= other.width
    }

    pub fn is_empty(self) -> bool {
        self.height == 0 || self.width == 0
    }

    /// Correlated interpolation between `lower` and `upper`: the same factor
    /// `f` scales both axes.
    pub fn lerp(lower: Size, upper: Size, f: f64) -> Size {
        let h = lower.height as f64 + f * (upper.height as f64 - lower.height as f64);
        let w = lower.width as f64 + f * (upper.width as f64 - lower.width as f64);
        Size::new(h as usize, w as usize)
    }
}

impl From<(usize, usize)> for Size {
    fn from((height, width): (usize, usize)) -> Self {
        Size::new(height, width)
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// A width x height grid of `channels`-byte pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// A zero-filled (black) buffer.
    pub fn new(width: usize, height: usize, channels: usize) -> Result<Self> {
        check_dims(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        })
    }

    /// Wrap existing interleaved bytes.
    pub fn from_raw(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        check_dims(width, height, channels)?;
        let expected = width * height * channels;
        if data.len() != expected {
            bail!(
                "raw buffer of {} bytes does not match {width}x{height}x{channels} ({expected})",
                data.len()
            );
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build a buffer by evaluating `f(x, y, channel)` for every byte.
    pub fn from_fn(
        width: usize,
        height: usize,
        channels: usize,
        mut f: impl FnMut(usize, usize, usize) -> u8,
    ) -> Result<Self> {
        let mut buf = Self::new(width, height, channels)?;
        for y in 0..height {
            for x in 0..width {
                let base = buf.offset(x, y);
                for c in 0..channels {
                    buf.data[base + c] = f(x, y, c);
                }
            }
        }
        Ok(buf)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn size(&self) -> Size {
        Size::new(self.height, self.width)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// The bytes of row `y`.
    pub fn row(&self, y: usize) -> &[u8] {
        let stride = self.width * self.channels;
        &self.data[y * stride..(y + 1) * stride]
    }

    /// Pixel components at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Result<&[u8]> {
        self.check(x, y)?;
        let base = self.offset(x, y);
        Ok(&self.data[base..base + self.channels])
    }

    /// Overwrite the pixel at `(x, y)`. `value` must hold exactly `channels`
    /// components.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: &[u8]) -> Result<()> {
        self.check(x, y)?;
        if value.len() != self.channels {
            return Err(Error::msg(format!(
                "pixel has {} components, buffer expects {}",
                value.len(),
                self.channels
            )));
        }
        let base = self.offset(x, y);
        self.data[base..base + self.channels].copy_from_slice(value);
        Ok(())
    }

    /// Nearest-neighbour resample to `new_height x new_width`.
    ///
    /// Destination pixel `d` maps to source `floor(d / (new / old))`,
    /// evaluated exactly as `d * old / new`.
    pub fn resize(&self, new_height: usize, new_width: usize) -> Result<Self> {
        let mut out = Self::new(new_width, new_height, self.channels)?;
        let c = self.channels;
        for row in 0..new_height {
            let old_row = row * self.height / new_height;
            for col in 0..new_width {
                let old_col = col * self.width / new_width;
                let src = self.offset(old_col, old_row);
                let dst = out.offset(col, row);
                out.data[dst..dst + c].copy_from_slice(&self.data[src..src + c]);
            }
        }
        Ok(out)
    }

    /// Copy the `size` rectangle whose top-left corner is `(left, top)`.
    ///
    /// Signed origin so that callers computing centered offsets can hand in
    /// negative coordinates and get a bounds error instead of wrapping.
    pub fn region(&self, left: i64, top: i64, size: Size) -> Result<Self> {
        let fits = left >= 0
            && top >= 0
            && left as usize + size.width <= self.width
            && top as usize + size.height <= self.height;
        if !fits {
            return Err(Error::out_of_bounds(
                left,
                top,
                size.width,
                size.height,
                self.width,
                self.height,
            ));
        }
        let (left, top) = (left as usize, top as usize);
        let mut out = Self::new(size.width, size.height, self.channels)?;
        let span = size.width * self.channels;
        for row in 0..size.height {
            let src = self.offset(left, top + row);
            let dst = out.offset(0, row);
            out.data[dst..dst + span].copy_from_slice(&self.data[src..src + span]);
        }
        Ok(out)
    }

    #[inline]
    pub(crate) fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * self.channels
    }

    fn check(&self, x: usize, y: usize) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(
                x as i64,
                y as i64,
                1,
                1,
                self.width,
                self.height,
            ));
        }
        Ok(())
    }
}

fn check_dims(width: usize, height: usize, channels: usize) -> Result<()> {
    if width == 0 || height == 0 || channels == 0 {
        bail!("buffer dimensions must be non-zero, got {width}x{height}x{channels}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> PixelBuffer {
        PixelBuffer::from_fn(w, h, 1, |x, y, _| (y * w + x) as u8).unwrap()
    }

    #[test]
    fn accessors_check_bounds() {
        let mut buf = PixelBuffer::new(4, 3, 3).unwrap();
        assert!(buf.pixel(3, 2).is_ok());
        assert!(matches!(buf.pixel(4, 0), Err(Error::OutOfBounds { .. })));
        assert!(buf.set_pixel(0, 3, &[1, 2, 3]).is_err());
        buf.set_pixel(1, 1, &[9, 8, 7]).unwrap();
        assert_eq!(buf.pixel(1, 1).unwrap(), &[9, 8, 7]);
        assert!(buf.set_pixel(1, 1, &[1]).is_err());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(PixelBuffer::new(0, 3, 3).is_err());
        assert!(PixelBuffer::from_raw(2, 2, 3, vec![0; 11]).is_err());
        assert_eq!(PixelBuffer::from_raw(2, 2, 3, vec![0; 12]).unwrap().row(1).len(), 6);
    }

    #[test]
    fn resize_nearest_neighbour() {
        // 0 1
        // 2 3
        let buf = ramp(2, 2);
        let up = buf.resize(4, 4).unwrap();
        assert_eq!((up.height(), up.width()), (4, 4));
        assert_eq!(up.row(0), &[0, 0, 1, 1]);
        assert_eq!(up.row(3), &[2, 2, 3, 3]);

        let down = ramp(4, 4).resize(2, 2).unwrap();
        assert_eq!(down.as_raw(), &[0, 2, 8, 10]);
    }

    #[test]
    fn region_copies_and_checks() {
        let buf = ramp(4, 4);
        let r = buf.region(1, 2, Size::new(2, 3)).unwrap();
        assert_eq!(r.as_raw(), &[9, 10, 11, 13, 14, 15]);
        assert!(buf.region(-1, 0, Size::new(1, 1)).is_err());
        assert!(buf.region(2, 0, Size::new(1, 3)).is_err());
    }

    #[test]
    fn size_lerp_is_correlated() {
        let lo = Size::new(10, 100);
        let hi = Size::new(20, 300);
        assert_eq!(Size::lerp(lo, hi, 0.0), lo);
        assert_eq!(Size::lerp(lo, hi, 1.0), hi);
        assert_eq!(Size::lerp(lo, hi, 0.5), Size::new(15, 200));
    }
}
