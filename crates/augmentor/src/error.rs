use std::path::PathBuf;

/// All errors that can occur within augmentor.
///
/// Configuration mistakes are reported when the pipeline is built, I/O and
/// bounds failures when it runs. Using a single error type across the crate
/// keeps propagation through the sampling loop a matter of `?`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid operation parameters (kernel, probability, ranges, flip axis).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A transform or accessor addressed pixels outside the buffer.
    #[error(
        "out of bounds: region [{x}, {y}] + [{width}x{height}] outside {buffer_width}x{buffer_height} buffer"
    )]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
        buffer_width: usize,
        buffer_height: usize,
    },

    /// The codec could not read or decode a source image.
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// The codec could not encode or write an output image.
    #[error("failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    /// The candidate root is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No candidate images matched the extension filter.
    #[error("no image files found in {0}")]
    NoImages(PathBuf),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed pipeline description.
    #[error("pipeline config: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create a configuration error.
    pub fn config(s: impl Into<String>) -> Self {
        Error::Config(s.into())
    }

    pub(crate) fn out_of_bounds(
        x: i64,
        y: i64,
        width: usize,
        height: usize,
        buffer_width: usize,
        buffer_height: usize,
    ) -> Self {
        Error::OutOfBounds {
            x,
            y,
            width,
            height,
            buffer_width,
            buffer_height,
        }
    }
}

/// Convenience Result type used throughout augmentor.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a configuration error.
/// Usage: `bail!("sigma must be positive, got {}", sigma)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Config(format!($($arg)*)))
    };
}
