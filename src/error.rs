use crate::Point;
use thiserror::Error;

/// Errors of the checked `Point` and `Rect` constructors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("coordinates must be finite, got ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    #[error("lower left corner ({lower_left}) is above or right of upper right corner ({upper_right})")]
    InvertedRect { lower_left: Point, upper_right: Point },
}
