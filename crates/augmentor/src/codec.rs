// ImageCodec — decode sources into buffers and encode results back out
//
// The sampling loop only ever talks to this trait. `FileCodec` (behind the
// `file-codec` feature) reads and writes real files through the `image`
// crate; `MemoryCodec` keeps everything in a map, which is what the tests and
// dry runs use.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Default JPEG quality for outputs.
pub const DEFAULT_QUALITY: u8 = 95;

/// Load/save interface the sampler needs from the outside world.
pub trait ImageCodec {
    /// Decode the image at `path`.
    fn load(&self, path: &Path) -> Result<PixelBuffer>;

    /// Encode `image` to `path`. `quality` is clamped to `[0, 100]`.
    fn save(&self, image: &PixelBuffer, path: &Path, quality: u8) -> Result<()>;
}

/// Clamp an encoder quality into `[0, 100]`.
pub fn clamp_quality(quality: u8) -> u8 {
    quality.min(100)
}

// MemoryCodec

/// A codec backed by an in-memory map from path to buffer.
///
/// `save` stores into the same map, so a saved output can be loaded back.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    images: Mutex<BTreeMap<PathBuf, PixelBuffer>>,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source image.
    pub fn insert(&self, path: impl Into<PathBuf>, image: PixelBuffer) -> Result<()> {
        self.lock()?.insert(path.into(), image);
        Ok(())
    }

    /// Fetch a stored image by path.
    pub fn get(&self, path: &Path) -> Option<PixelBuffer> {
        self.lock().ok()?.get(path).cloned()
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<PathBuf, PixelBuffer>>> {
        self.images
            .lock()
            .map_err(|_| Error::msg("memory codec lock poisoned"))
    }
}

impl ImageCodec for MemoryCodec {
    fn load(&self, path: &Path) -> Result<PixelBuffer> {
        self.lock()?.get(path).cloned().ok_or_else(|| Error::Decode {
            path: path.to_path_buf(),
            reason: "no such image".into(),
        })
    }

    fn save(&self, image: &PixelBuffer, path: &Path, _quality: u8) -> Result<()> {
        self.lock()?.insert(path.to_path_buf(), image.clone());
        Ok(())
    }
}

// FileCodec

#[cfg(feature = "file-codec")]
pub use file::FileCodec;

#[cfg(feature = "file-codec")]
mod file {
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::Path;

    use image::codecs::jpeg::JpegEncoder;
    use image::{DynamicImage, GenericImageView, ImageFormat};

    use super::{clamp_quality, ImageCodec};
    use crate::buffer::PixelBuffer;
    use crate::error::{Error, Result};

    /// Reads any format the `image` crate decodes into 8-bit luma or RGB, and
    /// writes JPEG (with quality) or whatever format the extension names.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FileCodec;

    fn decode_err(path: &Path, reason: impl ToString) -> Error {
        Error::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    fn encode_err(path: &Path, reason: impl ToString) -> Error {
        Error::Encode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    fn to_dynamic(buffer: &PixelBuffer, path: &Path) -> Result<DynamicImage> {
        let (w, h) = (buffer.width() as u32, buffer.height() as u32);
        let raw = buffer.as_raw().to_vec();
        let dynamic = match buffer.channels() {
            1 => image::GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            2 => image::GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            3 => image::RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            4 => image::RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
            c => return Err(encode_err(path, format!("unsupported channel count {c}"))),
        };
        dynamic.ok_or_else(|| encode_err(path, "buffer does not match its dimensions"))
    }

    fn is_jpeg(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
            .unwrap_or(true)
    }

    impl ImageCodec for FileCodec {
        fn load(&self, path: &Path) -> Result<PixelBuffer> {
            let img = image::open(path).map_err(|e| decode_err(path, e))?;
            let (width, height) = img.dimensions();
            let (width, height) = (width as usize, height as usize);
            if img.color().has_color() {
                PixelBuffer::from_raw(width, height, 3, img.to_rgb8().into_raw())
            } else {
                PixelBuffer::from_raw(width, height, 1, img.to_luma8().into_raw())
            }
        }

        fn save(&self, image: &PixelBuffer, path: &Path, quality: u8) -> Result<()> {
            let dynamic = to_dynamic(image, path)?;
            let file = File::create(path).map_err(|e| encode_err(path, e))?;
            let mut writer = BufWriter::new(file);

            if is_jpeg(path) {
                // JPEG carries no alpha; the encoder also wants quality >= 1.
                let dynamic = if dynamic.color().has_alpha() {
                    if dynamic.color().has_color() {
                        DynamicImage::ImageRgb8(dynamic.to_rgb8())
                    } else {
                        DynamicImage::ImageLuma8(dynamic.to_luma8())
                    }
                } else {
                    dynamic
                };
                let quality = clamp_quality(quality).max(1);
                let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
                dynamic
                    .write_with_encoder(encoder)
                    .map_err(|e| encode_err(path, e))?;
            } else {
                let format = ImageFormat::from_path(path).map_err(|e| encode_err(path, e))?;
                dynamic
                    .write_to(&mut writer, format)
                    .map_err(|e| encode_err(path, e))?;
            }
            writer.flush().map_err(|e| encode_err(path, e))
        }
    }
}
