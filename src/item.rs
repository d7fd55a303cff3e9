//! # Items
//!
//! An item is one overlay drawn onto a job's base image: a line of text, a
//! QR code, or another image. Items are validated once before rendering
//! starts and rendered in paint order.
//!
//! ## Configuration
//!
//! ```json
//! {
//!   "type": 0,
//!   "value": "Hello",
//!   "size": 48,
//!   "point": { "x": 120, "y": 40 },
//!   "apoint": { "x": 0.5, "y": 0 },
//!   "rgb": [255, 255, 255],
//!   "font": "fonts/Sans.ttf"
//! }
//! ```
//!
//! `type` is `0` for text, `1` for a QR code and `2` for a sub-image.

use image::{Rgb, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, DrawState, check_layer_size};
use crate::error::{DrawError, ValidationError};

/// Item kind as stored in configuration.
///
/// Unrecognised codes are kept so validation can report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ItemKind {
    #[default]
    Text,
    QrCode,
    SubImage,
    Unknown(i64),
}

impl From<i64> for ItemKind {
    fn from(code: i64) -> Self {
        match code {
            0 => ItemKind::Text,
            1 => ItemKind::QrCode,
            2 => ItemKind::SubImage,
            other => ItemKind::Unknown(other),
        }
    }
}

impl From<ItemKind> for i64 {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Text => 0,
            ItemKind::QrCode => 1,
            ItemKind::SubImage => 2,
            ItemKind::Unknown(code) => code,
        }
    }
}

/// An `{x, y}` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    #[serde(default, alias = "X")]
    pub x: f64,
    #[serde(default, alias = "Y")]
    pub y: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn unit_scale() -> Coords {
    Coords::new(1.0, 1.0)
}

/// One overlay as described in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    /// Text to draw, QR payload, or sub-image path.
    #[serde(default)]
    pub value: String,
    /// Font pixel size for text, side length for QR codes.
    #[serde(default)]
    pub size: f64,
    #[serde(rename = "point", default)]
    pub anchor_point: Coords,
    #[serde(rename = "apoint", default)]
    pub anchor_fraction: Coords,
    #[serde(default)]
    pub rgb: Vec<i32>,
    /// Font file (text only).
    #[serde(default)]
    pub font: String,
    /// Scale about `point` (sub-image only).
    #[serde(default = "unit_scale", alias = "Scale")]
    pub scale: Coords,
}

impl Default for ItemDescriptor {
    fn default() -> Self {
        Self {
            kind: ItemKind::Text,
            value: String::new(),
            size: 0.0,
            anchor_point: Coords::default(),
            anchor_fraction: Coords::default(),
            rgb: Vec::new(),
            font: String::new(),
            scale: unit_scale(),
        }
    }
}

impl ItemDescriptor {
    /// Fill color, if exactly three components are configured.
    ///
    /// Components are clamped to `0..=255`.
    pub fn color(&self) -> Option<Rgb<u8>> {
        match self.rgb.as_slice() {
            &[r, g, b] => Some(Rgb([clamp_u8(r), clamp_u8(g), clamp_u8(b)])),
            _ => None,
        }
    }

    /// Check that this item can be rendered. `index` is used for reporting.
    pub fn check_params(&self, index: usize) -> Result<(), ValidationError> {
        if self.value.is_empty() {
            return Err(ValidationError::EmptyValue { item: index });
        }

        match self.kind {
            ItemKind::Text => {
                if self.font.is_empty() {
                    return Err(ValidationError::MissingFont { item: index });
                }
                if self.rgb.len() != 3 {
                    return Err(ValidationError::InvalidColor {
                        item: index,
                        len: self.rgb.len(),
                    });
                }
            }
            ItemKind::QrCode | ItemKind::SubImage => {}
            ItemKind::Unknown(kind) => {
                return Err(ValidationError::UnknownItemKind { item: index, kind });
            }
        }

        Ok(())
    }
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

// ============================================================================
// RENDERING
// ============================================================================

/// Draw `item` onto `canvas` and commit it.
///
/// `state` is the draw state left by the previous item. The item's color
/// replaces the fill color when one is configured; otherwise the previous
/// color carries over. Sub-images compose their scale into the transform.
/// The resulting state is returned for the next item.
pub fn render(
    item: &ItemDescriptor,
    canvas: &mut Canvas,
    state: DrawState,
) -> Result<DrawState, DrawError> {
    let state = match item.color() {
        Some(color) => state.with_color(color),
        None => state,
    };

    let state = match item.kind {
        ItemKind::Text => render_text(item, canvas, state)?,
        ItemKind::QrCode => render_qr(item, canvas, state)?,
        ItemKind::SubImage => render_sub_image(item, canvas, state)?,
        ItemKind::Unknown(kind) => return Err(DrawError::UnknownItemKind(kind)),
    };

    canvas.fill();
    Ok(state)
}

fn render_text(
    item: &ItemDescriptor,
    canvas: &mut Canvas,
    state: DrawState,
) -> Result<DrawState, DrawError> {
    let face = Canvas::load_font_face(&item.font, item.size)?;
    let height = face.measure(&item.value).height as f64;

    // The anchor names the top of the text box; shift by one line so the
    // box starts below the configured point.
    canvas.draw_text_anchored(
        &face,
        &item.value,
        item.anchor_point.x,
        item.anchor_point.y + height,
        item.anchor_fraction.x,
        item.anchor_fraction.y,
        &state,
    )?;
    Ok(state)
}

fn render_qr(
    item: &ItemDescriptor,
    canvas: &mut Canvas,
    state: DrawState,
) -> Result<DrawState, DrawError> {
    let image = qr_image(&item.value, item.size)?;
    canvas.draw_image_anchored(
        image,
        item.anchor_point.x as i64,
        item.anchor_point.y as i64,
        item.anchor_fraction.x,
        item.anchor_fraction.y,
        &state,
    );
    Ok(state)
}

fn render_sub_image(
    item: &ItemDescriptor,
    canvas: &mut Canvas,
    state: DrawState,
) -> Result<DrawState, DrawError> {
    let image = image::open(&item.value)
        .map_err(|e| DrawError::ImageLoad(format!("{}: {}", item.value, e)))?
        .to_rgba8();

    let state = state.scale_about(
        item.scale.x,
        item.scale.y,
        item.anchor_point.x,
        item.anchor_point.y,
    );
    canvas.draw_image_anchored(
        image,
        item.anchor_point.x as i64,
        item.anchor_point.y as i64,
        item.anchor_fraction.x,
        item.anchor_fraction.y,
        &state,
    );
    Ok(state)
}

/// Render `data` as a borderless QR code of `size` x `size` pixels.
///
/// Uses medium error correction. The side never drops below one pixel per
/// module, and sides too large to allocate are rejected.
pub fn qr_image(data: &str, size: f64) -> Result<RgbaImage, DrawError> {
    let code = QrCode::with_error_correction_level(data, EcLevel::M)
        .map_err(|e| DrawError::QrGeneration(e.to_string()))?;

    let modules = code.width();
    let side = (size.max(0.0) as usize).max(modules);
    check_layer_size(side as u64, side as u64)?;

    Ok(RgbaImage::from_fn(side as u32, side as u32, |px, py| {
        let qx = px as usize * modules / side;
        let qy = py as usize * modules / side;
        if code[(qx, qy)] == qrcode::Color::Dark {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    }))
}
