//! Text output, text measurement and font introspection.

use super::{GlyphRunOptions, VwGraphics};
use crate::error::{GraphicsError, GraphicsResult};
use crate::geometry::{Point, Rect, Size};
use crate::style::BackColor;
use crate::surface::{DrawingSurface, FontMetrics, GlyphMetrics, GlyphRun, TextRun};
use crate::text::{justify_advances, leading_width};

/// Text whose top lies further than this many inches outside the vertical
/// clip is not sent to the device.
const TEXT_CLIP_SLOP_INCHES: i64 = 4;

impl<S: DrawingSurface> VwGraphics<S> {
    fn font_metrics(&self) -> GraphicsResult<FontMetrics> {
        self.measure_device()?.font_metrics()
    }

    /// Draw `text` with its top-left at (`x`, `y`).
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, stretch: i32) -> GraphicsResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let clip = self.clip_rect()?;
        let slop = self.y_units_per_inch()? as i64 * TEXT_CLIP_SLOP_INCHES;
        let top = y as i64;
        if top > clip.bottom as i64 + slop || top < clip.top as i64 - slop {
            log::trace!(target: "vwgraphics", "text at y={} outside clip, skipped", y);
            return Ok(());
        }
        let (break_char, mut advances) = {
            let measure = self.measure_device()?;
            (measure.font_metrics()?.break_char, measure.char_advances(text)?)
        };
        justify_advances(text, &mut advances, break_char, stretch);
        let run = TextRun {
            origin: Point::new(x, y),
            text,
            advances: &advances,
            fore: self.state.fore_color,
            back: self.state.back_color,
        };
        self.draw_device()?.draw_text(&run)
    }

    /// Draw pre-shaped glyphs. Missing advances are taken from the glyph metrics.
    pub fn draw_glyph_run(
        &mut self,
        x: i32,
        y: i32,
        glyphs: &[u16],
        options: GlyphRunOptions,
        clip: Option<Rect>,
        advances: Option<&[i32]>,
    ) -> GraphicsResult<()> {
        let advances = match advances {
            Some(adv) if adv.len() == glyphs.len() => adv.to_vec(),
            Some(adv) => {
                return Err(GraphicsError::InvalidArgument(format!(
                    "{} advances for {} glyphs",
                    adv.len(),
                    glyphs.len()
                )))
            }
            None => {
                let measure = self.measure_device()?;
                glyphs
                    .iter()
                    .map(|&g| measure.glyph_metrics(g).map(|m| m.advance_x))
                    .collect::<GraphicsResult<Vec<_>>>()?
            }
        };
        let run = GlyphRun {
            origin: Point::new(x, y),
            glyphs,
            advances: &advances,
            fore: self.state.fore_color,
            back: if options.opaque {
                self.state.back_color
            } else {
                BackColor::Transparent
            },
            clip: if options.clipped { clip.map(Rect::normalized) } else { None },
        };
        self.draw_device()?.draw_glyphs(&run)
    }

    /// Extent of `text` in the current font. Empty text measures zero wide
    /// and one line high.
    pub fn measure_text(&mut self, text: &str) -> GraphicsResult<Size> {
        let measure = self.measure_device()?;
        if text.is_empty() {
            return Ok(Size::new(0, measure.font_metrics()?.line_height()));
        }
        measure.text_extent(text)
    }

    pub fn measure_leading_width(&mut self, text: &str, char_index: usize, stretch: i32) -> GraphicsResult<i32> {
        if char_index == 0 {
            return Ok(0);
        }
        let measure = self.measure_device()?;
        let break_char = measure.font_metrics()?.break_char;
        let advances = measure.char_advances(text)?;
        Ok(leading_width(text, &advances, char_index, break_char, stretch))
    }

    pub fn font_ascent(&mut self) -> GraphicsResult<i32> {
        Ok(self.font_metrics()?.ascent)
    }

    pub fn font_descent(&mut self) -> GraphicsResult<i32> {
        Ok(self.font_metrics()?.descent)
    }

    pub fn font_em_square(&self) -> GraphicsResult<u32> {
        Ok(self.font_metrics()?.em_square)
    }

    pub fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics> {
        self.measure_device()?.glyph_metrics(glyph)
    }

    /// Copy table `tag` of the current font into `buffer`.
    ///
    /// Fails with [`GraphicsError::FontTableNotFound`] when the font has no
    /// such table, and with [`GraphicsError::FontTableBufferTooSmall`] when it
    /// does but `buffer` cannot hold it.
    pub fn font_table(&self, tag: [u8; 4], buffer: &mut [u8]) -> GraphicsResult<usize> {
        let table = self
            .measure_device()?
            .font_table(tag)?
            .ok_or(GraphicsError::FontTableNotFound(tag))?;
        if buffer.len() < table.len() {
            return Err(GraphicsError::FontTableBufferTooSmall {
                required: table.len(),
            });
        }
        buffer[..table.len()].copy_from_slice(&table);
        Ok(table.len())
    }

    pub fn font_table_size(&self, tag: [u8; 4]) -> GraphicsResult<usize> {
        self.measure_device()?
            .font_table(tag)?
            .map(|t| t.len())
            .ok_or(GraphicsError::FontTableNotFound(tag))
    }

    pub fn glyph_contour_point(&self, glyph: u16, point_index: usize) -> GraphicsResult<Point> {
        let points = self.measure_device()?.glyph_contour_points(glyph)?;
        points.get(point_index).copied().ok_or_else(|| {
            GraphicsError::InvalidArgument(format!(
                "glyph {} has {} contour points, index {} requested",
                glyph,
                points.len(),
                point_index
            ))
        })
    }
}
