//! Explicit draw state: fill color plus current transform.
//!
//! The surface itself holds no color or transform. Every draw call receives
//! a `DrawState`, and the job pipeline threads the state returned by one
//! item into the next.

use image::Rgb;
use kurbo::{Affine, Vec2};

/// Fill color and user-to-device transform for a draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub color: Rgb<u8>,
    pub transform: Affine,
}

impl Default for DrawState {
    /// Opaque black, identity transform.
    fn default() -> Self {
        Self {
            color: Rgb([0, 0, 0]),
            transform: Affine::IDENTITY,
        }
    }
}

impl DrawState {
    /// Replace the fill color.
    pub fn with_color(self, color: Rgb<u8>) -> Self {
        Self { color, ..self }
    }

    /// Compose a non-uniform scale pivoting about `(px, py)` into the
    /// current transform. The scale applies to user coordinates before any
    /// transform already present.
    pub fn scale_about(self, sx: f64, sy: f64, px: f64, py: f64) -> Self {
        let pivot = Vec2::new(px, py);
        let scale =
            Affine::translate(pivot) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-pivot);
        Self {
            transform: self.transform * scale,
            ..self
        }
    }

    /// True when the transform collapses an axis, so nothing can be drawn.
    pub fn is_degenerate(&self) -> bool {
        self.transform.determinant().abs() < 1e-12
    }
}
