//! The native device capability driven by [`VwGraphics`](crate::VwGraphics).
//!
//! A surface answers two kinds of requests: output (fills, strokes, text) and,
//! optionally, measurement (font metrics, advances, glyph introspection). A
//! record-only surface may leave the measurement methods at their defaults and
//! let the engine measure against a different device.

use crate::error::{GraphicsError, GraphicsResult};
use crate::geometry::{Point, Rect, Size};
use crate::style::{BackColor, FontSpec, Pen, Rgb};
use serde::{Deserialize, Serialize};

/// Handle to a font created on a particular surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontId(pub u32);

/// Token returned by [`DrawingSurface::save_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedState(pub u32);

/// Vertical metrics of the selected font, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i32,
    /// Positive distance below the baseline.
    pub descent: i32,
    pub external_leading: i32,
    /// Design units per em.
    pub em_square: u32,
    /// Character at which justification stretch is inserted.
    pub break_char: char,
}

impl FontMetrics {
    pub fn line_height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// Metrics of a single glyph, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphMetrics {
    pub black_box_width: i32,
    pub black_box_height: i32,
    /// Left edge of the black box relative to the glyph origin.
    pub origin_x: i32,
    /// Top edge of the black box relative to the baseline (positive is up).
    pub origin_y: i32,
    pub advance_x: i32,
    pub advance_y: i32,
}

/// A pre-shaped run of glyphs with explicit advances.
#[derive(Debug, Clone, Copy)]
pub struct GlyphRun<'a> {
    /// Top-left of the run's line box.
    pub origin: Point,
    pub glyphs: &'a [u16],
    pub advances: &'a [i32],
    pub fore: Rgb,
    pub back: BackColor,
    pub clip: Option<Rect>,
}

/// A run of characters with explicit per-character advances.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    /// Top-left of the run's line box.
    pub origin: Point,
    pub text: &'a str,
    /// One advance per `char` in `text`.
    pub advances: &'a [i32],
    pub fore: Rgb,
    pub back: BackColor,
}

/// A native drawing device.
pub trait DrawingSurface {
    /// Native resolution (x, y) in device units per inch.
    fn units_per_inch(&self) -> (u32, u32);

    /// Push the device state (clip region and selected font); returns a token
    /// for [`DrawingSurface::restore_state`].
    fn save_state(&mut self) -> SavedState;

    /// Restore the state saved under `token`, discarding anything saved after it.
    fn restore_state(&mut self, token: SavedState);

    /// The effective clip bounds. Surfaces without a clip return their full
    /// extent; surfaces that cannot report it reliably return [`Rect::UNBOUNDED`].
    fn clip_box(&self) -> Rect;

    /// The explicit clip region, or `None` when output is unclipped.
    fn clip_region(&self) -> Option<Rect>;

    fn set_clip_region(&mut self, clip: Option<Rect>);

    fn create_font(&mut self, spec: &FontSpec) -> GraphicsResult<FontId>;

    /// Select `font` (or the device default) and return the previously selected font.
    fn select_font(&mut self, font: Option<FontId>) -> Option<FontId>;

    fn delete_font(&mut self, font: FontId);

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> GraphicsResult<()>;

    fn move_to(&mut self, to: Point);

    /// Stroke from the current position to `to`, which becomes the new position.
    fn line_to(&mut self, to: Point, pen: Pen) -> GraphicsResult<()>;

    fn draw_text(&mut self, run: &TextRun<'_>) -> GraphicsResult<()>;

    fn draw_glyphs(&mut self, run: &GlyphRun<'_>) -> GraphicsResult<()>;

    /// Whether the measurement methods below are meaningful on this device.
    fn supports_measurement(&self) -> bool {
        false
    }

    fn font_metrics(&self) -> GraphicsResult<FontMetrics> {
        Err(GraphicsError::MeasurementUnsupported("font_metrics"))
    }

    /// One advance per `char` of `text` in the selected font.
    fn char_advances(&self, _text: &str) -> GraphicsResult<Vec<i32>> {
        Err(GraphicsError::MeasurementUnsupported("char_advances"))
    }

    /// Native extent of `text`. Callers must not rely on this for empty text.
    fn text_extent(&self, text: &str) -> GraphicsResult<Size> {
        let width = self.char_advances(text)?.iter().sum();
        Ok(Size::new(width, self.font_metrics()?.line_height()))
    }

    fn glyph_metrics(&self, _glyph: u16) -> GraphicsResult<GlyphMetrics> {
        Err(GraphicsError::MeasurementUnsupported("glyph_metrics"))
    }

    /// Raw bytes of an OpenType table, or `None` when the font has no such table.
    fn font_table(&self, _tag: [u8; 4]) -> GraphicsResult<Option<Vec<u8>>> {
        Err(GraphicsError::MeasurementUnsupported("font_table"))
    }

    /// Outline points of a glyph in outline order, in device units
    /// (y grows downward from the baseline).
    fn glyph_contour_points(&self, _glyph: u16) -> GraphicsResult<Vec<Point>> {
        Err(GraphicsError::MeasurementUnsupported("glyph_contour_points"))
    }
}

impl<S: DrawingSurface + ?Sized> DrawingSurface for Box<S> {
    fn units_per_inch(&self) -> (u32, u32) {
        (**self).units_per_inch()
    }
    fn save_state(&mut self) -> SavedState {
        (**self).save_state()
    }
    fn restore_state(&mut self, token: SavedState) {
        (**self).restore_state(token)
    }
    fn clip_box(&self) -> Rect {
        (**self).clip_box()
    }
    fn clip_region(&self) -> Option<Rect> {
        (**self).clip_region()
    }
    fn set_clip_region(&mut self, clip: Option<Rect>) {
        (**self).set_clip_region(clip)
    }
    fn create_font(&mut self, spec: &FontSpec) -> GraphicsResult<FontId> {
        (**self).create_font(spec)
    }
    fn select_font(&mut self, font: Option<FontId>) -> Option<FontId> {
        (**self).select_font(font)
    }
    fn delete_font(&mut self, font: FontId) {
        (**self).delete_font(font)
    }
    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> GraphicsResult<()> {
        (**self).fill_rect(rect, color)
    }
    fn move_to(&mut self, to: Point) {
        (**self).move_to(to)
    }
    fn line_to(&mut self, to: Point, pen: Pen) -> GraphicsResult<()> {
        (**self).line_to(to, pen)
    }
    fn draw_text(&mut self, run: &TextRun<'_>) -> GraphicsResult<()> {
        (**self).draw_text(run)
    }
    fn draw_glyphs(&mut self, run: &GlyphRun<'_>) -> GraphicsResult<()> {
        (**self).draw_glyphs(run)
    }
    fn supports_measurement(&self) -> bool {
        (**self).supports_measurement()
    }
    fn font_metrics(&self) -> GraphicsResult<FontMetrics> {
        (**self).font_metrics()
    }
    fn char_advances(&self, text: &str) -> GraphicsResult<Vec<i32>> {
        (**self).char_advances(text)
    }
    fn text_extent(&self, text: &str) -> GraphicsResult<Size> {
        (**self).text_extent(text)
    }
    fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics> {
        (**self).glyph_metrics(glyph)
    }
    fn font_table(&self, tag: [u8; 4]) -> GraphicsResult<Option<Vec<u8>>> {
        (**self).font_table(tag)
    }
    fn glyph_contour_points(&self, glyph: u16) -> GraphicsResult<Vec<Point>> {
        (**self).glyph_contour_points(glyph)
    }
}
