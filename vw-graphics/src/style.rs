//! Colors, pens and character rendering properties.

use crate::error::{GraphicsError, GraphicsResult};
use serde::{Deserialize, Serialize};

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` value.
    pub const fn from_u32(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Parse a CSS color string (`"#336699"`, `"navy"`, `"rgb(0,0,0)"`).
    ///
    /// Alpha is ignored; use [`BackColor::Transparent`] for transparency.
    pub fn parse(s: &str) -> GraphicsResult<Self> {
        let parsed = csscolorparser::parse(s)
            .map_err(|e| GraphicsError::ColorParseError(format!("{}: {}", s, e)))?;
        let [r, g, b, _a] = parsed.to_rgba8();
        Ok(Self::new(r, g, b))
    }
}

impl From<Rgb> for tiny_skia::Color {
    fn from(c: Rgb) -> Self {
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, 255)
    }
}

/// Background color, which may be transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackColor {
    #[default]
    Transparent,
    Color(Rgb),
}

impl BackColor {
    pub fn opaque(self) -> Option<Rgb> {
        match self {
            BackColor::Transparent => None,
            BackColor::Color(c) => Some(c),
        }
    }
}

impl From<Rgb> for BackColor {
    fn from(c: Rgb) -> Self {
        BackColor::Color(c)
    }
}

/// A stroke color and width in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub color: Rgb,
    pub width: i32,
}

/// Everything a run of text needs in order to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharRenderProps {
    pub fore_color: Rgb,
    pub back_color: BackColor,
    pub bold: bool,
    pub italic: bool,
    /// Font size in millipoints (1/72000 inch).
    pub size_mp: i32,
    pub face_name: String,
}

impl Default for CharRenderProps {
    fn default() -> Self {
        Self {
            fore_color: Rgb::BLACK,
            back_color: BackColor::Transparent,
            bold: false,
            italic: false,
            size_mp: 10_000,
            face_name: "sans-serif".to_string(),
        }
    }
}

impl CharRenderProps {
    /// The subset of these properties that determines device font selection,
    /// with the height resolved for a device of `dpi_y` units per inch.
    pub fn font_spec(&self, dpi_y: u32) -> FontSpec {
        let height = ((self.size_mp as i64 * dpi_y as i64 + 36_000) / 72_000) as i32;
        FontSpec {
            bold: self.bold,
            italic: self.italic,
            height: height.max(1),
            face_name: self.face_name.clone(),
        }
    }
}

/// The font-selection-relevant subset of [`CharRenderProps`].
///
/// Two specs compare equal exactly when they would select the same device font;
/// colors are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub bold: bool,
    pub italic: bool,
    /// Em height in device units.
    pub height: i32,
    pub face_name: String,
}
