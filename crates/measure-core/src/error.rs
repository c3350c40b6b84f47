use thiserror::Error;

use crate::Real;

/// Reasons a point or sample could not be resolved.
///
/// None of these are fatal: callers treat them as "no measurement" for the
/// affected tap or grid cell and keep their previous state.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MeasureError {
    /// Pixel (or scaled view coordinate) outside the texture.
    #[error("pixel ({u}, {v}) outside {width}x{height} texture")]
    OutOfBounds {
        u: Real,
        v: Real,
        width: usize,
        height: usize,
    },
    /// Decoded depth is zero, negative, or not finite.
    #[error("invalid depth {0}")]
    InvalidDepth(Real),
    /// No depth frame has been produced yet.
    #[error("depth data unavailable")]
    DataUnavailable,
}
