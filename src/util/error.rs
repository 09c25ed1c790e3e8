//! Error types for stereocorr.

use crate::field::FeatureShape;
use thiserror::Error;

/// Result alias for stereocorr operations.
pub type StereoCorrResult<T> = std::result::Result<T, StereoCorrError>;

/// Caller contract violations reported by the kernels.
///
/// Numerical degeneracies (flat patches, zero correlation denominators,
/// border pixels) are not errors; they produce zero sentinels instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StereoCorrError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width or height is zero or overflows the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Channel count is zero.
    #[error("invalid channel count: {channels}")]
    InvalidChannels { channels: usize },
    /// Row stride is shorter than one row of pixels.
    #[error("invalid stride {stride} for row length {row_len}")]
    InvalidStride { row_len: usize, stride: usize },
    /// Backing buffer is shorter than the declared layout requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Owned buffer length disagrees with the declared layout.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// Per-cell vector length is not what the operation expects.
    #[error("invalid cell length: expected {expected}, got {got}")]
    InvalidCellLength { expected: usize, got: usize },
    /// Patch window is zero or even.
    #[error("window size must be a positive odd integer, got {window_size}")]
    InvalidWindowSize { window_size: usize },
    /// A calibration matrix cannot be inverted.
    #[error("{matrix} matrix is singular (determinant {det:e})")]
    SingularMatrix { matrix: &'static str, det: f64 },
    /// Two feature fields do not share the same layout.
    #[error("feature field shape mismatch: {left} vs {right}")]
    ShapeMismatch {
        left: FeatureShape,
        right: FeatureShape,
    },
    /// Image decoding or encoding failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}
