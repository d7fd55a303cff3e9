//! Font faces and text rasterization.
//!
//! Text is rendered to an anti-aliased RGBA layer using ab_glyph. The layer
//! carries the fill color in its RGB channels and glyph coverage in alpha,
//! so it composites onto the surface like any other image.

use ab_glyph::{Font, FontArc, GlyphId, OutlinedGlyph, ScaleFont};
use image::{Rgb, Rgba, RgbaImage};
use std::path::Path;

use super::check_layer_size;
use crate::error::DrawError;

/// A font loaded from disk at a fixed pixel size.
#[derive(Clone)]
pub struct FontFace {
    font: FontArc,
    px: f32,
}

/// Measured extent of a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Sum of glyph advances (with kerning).
    pub width: f32,
    /// Ascent minus descent.
    pub height: f32,
    /// Distance from the top of the box to the baseline.
    pub ascent: f32,
}

/// Rasterized text placed at an integer origin in user space.
pub struct TextLayer {
    pub image: RgbaImage,
    pub left: i64,
    pub top: i64,
}

impl FontFace {
    /// Load a TrueType/OpenType font from `path` sized to `size` pixels.
    pub fn load(path: impl AsRef<Path>, size: f64) -> Result<Self, DrawError> {
        let path = path.as_ref();
        if !(size.is_finite() && size > 0.0) {
            return Err(DrawError::FontLoad(format!(
                "invalid font size {} for {}",
                size,
                path.display()
            )));
        }
        let bytes = std::fs::read(path)
            .map_err(|e| DrawError::FontLoad(format!("{}: {}", path.display(), e)))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| DrawError::FontLoad(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            font,
            px: size as f32,
        })
    }

    /// Measure `text` as a single line.
    pub fn measure(&self, text: &str) -> TextExtent {
        let scaled = self.font.as_scaled(self.px);
        let width = self
            .layout(text)
            .last()
            .map(|&(id, x)| x + scaled.h_advance(id))
            .unwrap_or(0.0);
        TextExtent {
            width,
            height: scaled.ascent() - scaled.descent(),
            ascent: scaled.ascent(),
        }
    }

    /// Glyph ids with their caret x positions.
    fn layout(&self, text: &str) -> Vec<(GlyphId, f32)> {
        let scaled = self.font.as_scaled(self.px);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret_x = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = prev {
                caret_x += scaled.kern(prev, id);
            }
            glyphs.push((id, caret_x));
            caret_x += scaled.h_advance(id);
            prev = Some(id);
        }
        glyphs
    }

    /// Glyph outlines for a text box whose top-left sits at `(fx, fy)`.
    fn outlines(&self, text: &str, fx: f32, fy: f32) -> Vec<OutlinedGlyph> {
        let baseline_y = fy + self.font.as_scaled(self.px).ascent();
        self.layout(text)
            .into_iter()
            .filter_map(|(id, glyph_x)| {
                let glyph = id
                    .with_scale_and_position(self.px, ab_glyph::point(fx + glyph_x, baseline_y));
                self.font.outline_glyph(glyph)
            })
            .collect()
    }

    /// Rasterize `text` in the fill `color` with its text box's top-left at
    /// `(x, y)`.
    ///
    /// The layer covers the text box and every glyph's ink, so overhangs
    /// past the advance width or above the ascent are kept.
    pub fn rasterize(
        &self,
        text: &str,
        color: Rgb<u8>,
        x: f64,
        y: f64,
    ) -> Result<TextLayer, DrawError> {
        let extent = self.measure(text);
        let (ox, oy) = (x.floor(), y.floor());
        let (fx, fy) = ((x - ox) as f32, (y - oy) as f32);
        let outlines = self.outlines(text, fx, fy);

        let (mut min_x, mut min_y) = (0.0f32, 0.0f32);
        let (mut max_x, mut max_y) = (fx + extent.width, fy + extent.height);
        for glyph in &outlines {
            let b = glyph.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }

        let (left, top) = (min_x.floor() as i64, min_y.floor() as i64);
        let width = (max_x.ceil() as i64 - left).max(1) as u64;
        let height = (max_y.ceil() as i64 - top).max(1) as u64;
        check_layer_size(width, height)?;
        let (width, height) = (width as u32, height as u32);

        let mut coverage = vec![0.0f32; width as usize * height as usize];
        for glyph in &outlines {
            let b = glyph.px_bounds();
            glyph.draw(|px, py, c| {
                let lx = px as i64 + b.min.x.floor() as i64 - left;
                let ly = py as i64 + b.min.y.floor() as i64 - top;

                if lx >= 0 && lx < width as i64 && ly >= 0 && ly < height as i64 {
                    let idx = ly as usize * width as usize + lx as usize;
                    coverage[idx] = (coverage[idx] + c).min(1.0);
                }
            });
        }

        let Rgb([r, g, b]) = color;
        let image = RgbaImage::from_fn(width, height, |px, py| {
            let c = coverage[py as usize * width as usize + px as usize];
            Rgba([r, g, b, (c * 255.0).round() as u8])
        });

        Ok(TextLayer {
            image,
            left: ox as i64 + left,
            top: oy as i64 + top,
        })
    }
}

/// Font shipped with the tests (DejaVu Sans, see `DejaVuSans-LICENSE.txt`).
#[cfg(test)]
pub(crate) fn test_font() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans.ttf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_font() {
        let err = FontFace::load("/definitely/not/here.ttf", 24.0).err().unwrap();
        assert!(matches!(err, DrawError::FontLoad(_)));
    }

    #[test]
    fn test_load_malformed_font() {
        let path = std::env::temp_dir().join(format!("imgstamp-{}.ttf", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"not a font at all").unwrap();
        let err = FontFace::load(&path, 24.0).err().unwrap();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, DrawError::FontLoad(_)));
    }

    #[test]
    fn test_load_rejects_zero_size() {
        assert!(matches!(
            FontFace::load(test_font(), 0.0),
            Err(DrawError::FontLoad(_))
        ));
    }

    #[test]
    fn test_measure_text() {
        let face = FontFace::load(test_font(), 32.0).unwrap();
        let short = face.measure("Hi");
        let long = face.measure("Hello there");
        assert!(short.width > 0.0);
        assert!(long.width > short.width);
        assert!(short.height > 0.0);
        assert_eq!(short.height, long.height);
        assert!(short.ascent > 0.0 && short.ascent <= short.height);
    }

    #[test]
    fn test_rasterize_uses_fill_color() {
        let face = FontFace::load(test_font(), 40.0).unwrap();
        let layer = face.rasterize("Ink", Rgb([200, 10, 20]), 0.0, 0.0).unwrap();
        let img = &layer.image;
        assert!(img.width() > 0 && img.height() > 0);
        assert!(img.pixels().any(|p| p[3] > 0));
        assert!(img.pixels().all(|p| p[0] == 200 && p[1] == 10 && p[2] == 20));
        // Anti-aliased edges
        assert!(img.pixels().any(|p| p[3] > 0 && p[3] < 255));
    }

    #[test]
    fn test_rasterize_empty_text_is_blank() {
        let face = FontFace::load(test_font(), 20.0).unwrap();
        let layer = face.rasterize("", Rgb([0, 0, 0]), 3.0, 4.0).unwrap();
        assert_eq!(layer.image.width(), 1);
        assert_eq!((layer.left, layer.top), (3, 4));
        assert!(layer.image.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_rasterize_keeps_ink_outside_advance_box() {
        let face = FontFace::load(test_font(), 60.0).unwrap();
        let text = "jÅ";
        let extent = face.measure(text);
        let layer = face.rasterize(text, Rgb([0, 0, 0]), 10.25, 20.5).unwrap();

        let right = layer.left + layer.image.width() as i64;
        let bottom = layer.top + layer.image.height() as i64;
        let mut overhangs = false;
        for glyph in face.outlines(text, 0.25, 0.5) {
            let b = glyph.px_bounds();
            let (x0, y0) = (10 + b.min.x.floor() as i64, 20 + b.min.y.floor() as i64);
            let (x1, y1) = (10 + b.max.x.ceil() as i64, 20 + b.max.y.ceil() as i64);
            assert!(x0 >= layer.left && y0 >= layer.top, "glyph clipped at top-left");
            assert!(x1 <= right && y1 <= bottom, "glyph clipped at bottom-right");

            overhangs |= b.min.x < 0.25
                || b.min.y < 0.5
                || b.max.x > 0.25 + extent.width
                || b.max.y > 0.5 + extent.height;
        }
        assert!(overhangs, "fixture text should reach past its advance box");
    }

    #[test]
    fn test_rasterize_rejects_huge_size() {
        let face = FontFace::load(test_font(), 1.0e6).unwrap();
        assert!(matches!(
            face.rasterize("Huge", Rgb([0, 0, 0]), 0.0, 0.0),
            Err(DrawError::LayerTooLarge { .. })
        ));
    }
}
