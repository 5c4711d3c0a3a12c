//! Error types for the rendering core.
//!
//! Only invalid input is an error. Geometric degeneracies (an empty path, a
//! zero-length gradient, a singular transform inside a draw call) render
//! nothing and succeed; out-of-bounds geometry is clipped.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the rendering core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Width or height is zero or too large to address.
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Row stride shorter than one row of pixels.
    #[error("Invalid stride: {stride} bytes (at least {min} required)")]
    InvalidStride { stride: usize, min: usize },

    /// Buffer cannot hold `height` rows of `stride` bytes.
    #[error("Buffer too small: {len} bytes, {required} required")]
    BufferTooSmall { len: usize, required: usize },

    /// A parallelogram must be given as exactly six coordinates.
    #[error("Invalid parallelogram: expected 6 coordinates, got {0}")]
    InvalidParallelogram(usize),

    /// The source image has no pixels.
    #[error("Empty image")]
    EmptyImage,

    /// The requested source rectangle covers no pixels of the image.
    #[error("Empty source rectangle: ({x1}, {y1}) - ({x2}, {y2})")]
    EmptySourceRect { x1: i32, y1: i32, x2: i32, y2: i32 },

    /// The matrix determinant is too close to zero to invert.
    #[error("Singular transform: determinant {det}")]
    SingularTransform { det: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = Error::InvalidParallelogram(4);
        assert_eq!(
            e.to_string(),
            "Invalid parallelogram: expected 6 coordinates, got 4"
        );
        let e = Error::InvalidStride { stride: 8, min: 40 };
        assert_eq!(e.to_string(), "Invalid stride: 8 bytes (at least 40 required)");
    }

    #[test]
    fn test_result_alias() {
        fn fails() -> Result<()> {
            Err(Error::EmptyImage)
        }
        assert_eq!(fails(), Err(Error::EmptyImage));
    }
}
