//! # Canvas Surface
//!
//! A mutable RGBA raster built from a base image, plus a queue of pending
//! draw operations.
//!
//! ## Anchoring
//!
//! Every draw takes a target point `(x, y)` and an anchor fraction
//! `(ax, ay)`. The content's bounding box is placed so that `(0, 0)` puts
//! its top-left on the target, `(1, 1)` its bottom-right, and anything in
//! between interpolates linearly:
//!
//! ```text
//! top_left = (x - ax * width, y - ay * height)
//! ```
//!
//! ## Commit model
//!
//! Draw calls only enqueue. [`Canvas::fill`] rasterizes the queue in order
//! and composites each operation source-over onto the pixels, mapping
//! device pixels back through the inverse of the operation's transform.

mod state;
mod text;

pub use state::DrawState;
pub use text::{FontFace, TextExtent, TextLayer};

#[cfg(test)]
pub(crate) use text::test_font;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use kurbo::{Point, Rect};
use std::path::Path;
use tracing::debug;

use crate::error::DrawError;

/// Largest layer, in pixels, a single draw may allocate.
pub const MAX_LAYER_PIXELS: u64 = 1 << 28;

/// Reject layers whose pixel count overflows or exceeds [`MAX_LAYER_PIXELS`].
pub fn check_layer_size(width: u64, height: u64) -> Result<(), DrawError> {
    match width.checked_mul(height) {
        Some(pixels) if pixels <= MAX_LAYER_PIXELS => Ok(()),
        _ => Err(DrawError::LayerTooLarge { width, height }),
    }
}

/// Bounding box of content of `width` x `height` anchored at `(x, y)`.
pub fn anchored_box(width: f64, height: f64, x: f64, y: f64, ax: f64, ay: f64) -> Rect {
    let x0 = x - ax * width;
    let y0 = y - ay * height;
    Rect::new(x0, y0, x0 + width, y0 + height)
}

/// One queued draw: a layer placed at an integer origin in user space.
struct PendingDraw {
    layer: RgbaImage,
    origin: (i64, i64),
    state: DrawState,
}

/// Raster surface for one job.
pub struct Canvas {
    pixels: RgbaImage,
    pending: Vec<PendingDraw>,
}

impl Canvas {
    /// Wrap a decoded base image.
    pub fn new(base: DynamicImage) -> Self {
        Self {
            pixels: base.to_rgba8(),
            pending: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Committed pixels. Pending draws are not visible until [`Canvas::fill`].
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Number of draws waiting for [`Canvas::fill`].
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Load a font face for text draws.
    pub fn load_font_face(path: impl AsRef<Path>, size: f64) -> Result<FontFace, DrawError> {
        FontFace::load(path, size)
    }

    /// Queue `text` anchored at `(x, y)` in the state's fill color.
    ///
    /// Returns the text box in user space.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_anchored(
        &mut self,
        face: &FontFace,
        text: &str,
        x: f64,
        y: f64,
        ax: f64,
        ay: f64,
        state: &DrawState,
    ) -> Result<Rect, DrawError> {
        let extent = face.measure(text);
        let bbox = anchored_box(
            extent.width as f64,
            extent.height as f64,
            x,
            y,
            ax,
            ay,
        );

        let TextLayer { image, left, top } = face.rasterize(text, state.color, bbox.x0, bbox.y0)?;

        self.pending.push(PendingDraw {
            layer: image,
            origin: (left, top),
            state: *state,
        });
        Ok(bbox)
    }

    /// Queue `image` anchored at the integer point `(x, y)`.
    ///
    /// The anchor offset is truncated to whole pixels.
    pub fn draw_image_anchored(
        &mut self,
        image: RgbaImage,
        x: i64,
        y: i64,
        ax: f64,
        ay: f64,
        state: &DrawState,
    ) {
        let ox = x - (ax * image.width() as f64) as i64;
        let oy = y - (ay * image.height() as f64) as i64;
        self.pending.push(PendingDraw {
            layer: image,
            origin: (ox, oy),
            state: *state,
        });
    }

    /// Commit all pending draws in the order they were queued.
    pub fn fill(&mut self) {
        for draw in std::mem::take(&mut self.pending) {
            self.composite(&draw);
        }
    }

    /// Commit pending draws and write the surface as PNG.
    pub fn save_png(&mut self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.fill();
        self.pixels.save_with_format(path, ImageFormat::Png)
    }

    fn composite(&mut self, draw: &PendingDraw) {
        if draw.state.is_degenerate() {
            debug!("skipping draw under degenerate transform");
            return;
        }

        let (lw, lh) = draw.layer.dimensions();
        let (ox, oy) = (draw.origin.0 as f64, draw.origin.1 as f64);
        let user_rect = Rect::new(ox, oy, ox + lw as f64, oy + lh as f64);
        let device = draw.state.transform.transform_rect_bbox(user_rect);

        let x_start = device.x0.floor().max(0.0) as u32;
        let y_start = device.y0.floor().max(0.0) as u32;
        let x_end = (device.x1.ceil().max(0.0) as u32).min(self.pixels.width());
        let y_end = (device.y1.ceil().max(0.0) as u32).min(self.pixels.height());

        let inverse = draw.state.transform.inverse();

        for dy in y_start..y_end {
            for dx in x_start..x_end {
                let src = inverse * Point::new(dx as f64 + 0.5, dy as f64 + 0.5);
                let lx = (src.x - ox).floor();
                let ly = (src.y - oy).floor();
                if lx < 0.0 || ly < 0.0 || lx >= lw as f64 || ly >= lh as f64 {
                    continue;
                }

                let top = *draw.layer.get_pixel(lx as u32, ly as u32);
                let dst = self.pixels.get_pixel_mut(dx, dy);
                *dst = blend_over(*dst, top);
            }
        }
    }
}

/// Source-over compositing of non-premultiplied RGBA.
fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| -> u8 {
        let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}
