//! A record-only surface that captures a serializable display list.
//!
//! Like a metafile, a [`RecordingSurface`] cannot report its native clip
//! (it answers [`Rect::UNBOUNDED`] unless an explicit clip region is set) and
//! cannot measure text, so it is normally paired with a separate measuring
//! surface. Constructed with [`FixedMetrics`] it measures with a deterministic
//! fixed-pitch font model instead.

use crate::error::{GraphicsError, GraphicsResult};
use crate::geometry::{Point, Rect};
use crate::style::{BackColor, FontSpec, Pen, Rgb};
use crate::surface::{DrawingSurface, FontId, FontMetrics, GlyphMetrics, GlyphRun, SavedState, TextRun};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One recorded device call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    SaveState { token: SavedState },
    RestoreState { token: SavedState },
    SetClip { clip: Option<Rect> },
    CreateFont { font: FontId, spec: FontSpec },
    SelectFont { font: Option<FontId> },
    DeleteFont { font: FontId },
    FillRect { rect: Rect, color: Rgb },
    MoveTo { to: Point },
    LineTo { to: Point, pen: Pen },
    Text {
        origin: Point,
        text: String,
        advances: Vec<i32>,
        fore: Rgb,
        back: BackColor,
    },
    Glyphs {
        origin: Point,
        glyphs: Vec<u16>,
        advances: Vec<i32>,
        fore: Rgb,
        back: BackColor,
        clip: Option<Rect>,
    },
}

/// Fixed-pitch font model; proportions are fractions of the em height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedMetrics {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
    /// Reported design units per em.
    pub em_square: u16,
    pub break_char: char,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            advance: 0.5,
            ascent: 0.8,
            descent: 0.2,
            em_square: 2048,
            break_char: ' ',
        }
    }
}

impl FixedMetrics {
    fn scaled(&self, fraction: f32, height: i32) -> i32 {
        (fraction * height as f32).round() as i32
    }

    fn font_metrics(&self, spec: &FontSpec) -> FontMetrics {
        FontMetrics {
            ascent: self.scaled(self.ascent, spec.height),
            descent: self.scaled(self.descent, spec.height),
            external_leading: 0,
            em_square: u32::from(self.em_square),
            break_char: self.break_char,
        }
    }

    fn advance_for(&self, spec: &FontSpec) -> i32 {
        self.scaled(self.advance, spec.height).max(1)
    }

    fn glyph_metrics(&self, spec: &FontSpec, glyph: u16) -> GlyphMetrics {
        let advance = self.advance_for(spec);
        if glyph == self.break_char as u16 {
            return GlyphMetrics {
                advance_x: advance,
                ..GlyphMetrics::default()
            };
        }
        let bearing = spec.height / 10;
        let ascent = self.scaled(self.ascent, spec.height);
        GlyphMetrics {
            black_box_width: (advance - 2 * bearing).max(1),
            black_box_height: ascent,
            origin_x: bearing,
            origin_y: ascent,
            advance_x: advance,
            advance_y: 0,
        }
    }

    /// Every non-break glyph is drawn as its black box.
    fn contour_points(&self, spec: &FontSpec, glyph: u16) -> Vec<Point> {
        let m = self.glyph_metrics(spec, glyph);
        if m.black_box_width == 0 {
            return Vec::new();
        }
        let (left, right) = (m.origin_x, m.origin_x + m.black_box_width);
        vec![
            Point::new(left, -m.origin_y),
            Point::new(right, -m.origin_y),
            Point::new(right, 0),
            Point::new(left, 0),
        ]
    }

    /// A minimal `head` table carrying the em square; the model has no other tables.
    fn table(&self, tag: [u8; 4]) -> Option<Vec<u8>> {
        if &tag != b"head" {
            return None;
        }
        let mut head = vec![0u8; 54];
        head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        head[18..20].copy_from_slice(&self.em_square.to_be_bytes());
        Some(head)
    }
}

/// Record-only drawing surface.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    dpi: (u32, u32),
    commands: Vec<DrawCommand>,
    metrics: Option<FixedMetrics>,
    fonts: HashMap<FontId, FontSpec>,
    next_font: u32,
    selected: Option<FontId>,
    clip: Option<Rect>,
    saved: Vec<(Option<Rect>, Option<FontId>)>,
}

impl RecordingSurface {
    /// A surface of `dpi` units per inch on both axes that cannot measure.
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi: (dpi, dpi),
            commands: Vec::new(),
            metrics: None,
            fonts: HashMap::new(),
            next_font: 1,
            selected: None,
            clip: None,
            saved: Vec::new(),
        }
    }

    /// A surface that measures with `metrics`.
    pub fn with_metrics(dpi: u32, metrics: FixedMetrics) -> Self {
        Self {
            metrics: Some(metrics),
            ..Self::new(dpi)
        }
    }

    /// Use a different vertical resolution.
    pub fn with_y_resolution(mut self, dpi_y: u32) -> Self {
        self.dpi.1 = dpi_y;
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Fonts created on this surface and not yet deleted.
    pub fn live_fonts(&self) -> usize {
        self.fonts.len()
    }

    pub fn selected_font(&self) -> Option<FontId> {
        self.selected
    }

    /// Number of saved states not yet restored.
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    /// Serialize the display list as pretty-printed JSON.
    pub fn to_json(&self) -> GraphicsResult<String> {
        Ok(serde_json::to_string_pretty(&self.commands)?)
    }

    fn model(&self, op: &'static str) -> GraphicsResult<(&FixedMetrics, &FontSpec)> {
        let metrics = self
            .metrics
            .as_ref()
            .ok_or(GraphicsError::MeasurementUnsupported(op))?;
        let spec = self
            .selected
            .and_then(|id| self.fonts.get(&id))
            .ok_or(GraphicsError::NoFontSelected)?;
        Ok((metrics, spec))
    }
}

impl DrawingSurface for RecordingSurface {
    fn units_per_inch(&self) -> (u32, u32) {
        self.dpi
    }

    fn save_state(&mut self) -> SavedState {
        let token = SavedState(self.saved.len() as u32);
        self.saved.push((self.clip, self.selected));
        self.commands.push(DrawCommand::SaveState { token });
        token
    }

    fn restore_state(&mut self, token: SavedState) {
        let index = token.0 as usize;
        let Some(&(clip, selected)) = self.saved.get(index) else {
            log::warn!(target: "vwgraphics", "restore of unknown saved state {}", token.0);
            return;
        };
        self.saved.truncate(index);
        self.clip = clip;
        self.selected = selected;
        self.commands.push(DrawCommand::RestoreState { token });
    }

    fn clip_box(&self) -> Rect {
        self.clip.unwrap_or(Rect::UNBOUNDED)
    }

    fn clip_region(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip_region(&mut self, clip: Option<Rect>) {
        self.clip = clip;
        self.commands.push(DrawCommand::SetClip { clip });
    }

    fn create_font(&mut self, spec: &FontSpec) -> GraphicsResult<FontId> {
        if spec.height <= 0 || spec.face_name.is_empty() {
            return Err(GraphicsError::FontCreation {
                face: spec.face_name.clone(),
                reason: format!("unusable height {}", spec.height),
            });
        }
        let font = FontId(self.next_font);
        self.next_font += 1;
        self.fonts.insert(font, spec.clone());
        self.commands.push(DrawCommand::CreateFont {
            font,
            spec: spec.clone(),
        });
        Ok(font)
    }

    fn select_font(&mut self, font: Option<FontId>) -> Option<FontId> {
        self.commands.push(DrawCommand::SelectFont { font });
        std::mem::replace(&mut self.selected, font)
    }

    fn delete_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
        self.commands.push(DrawCommand::DeleteFont { font });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> GraphicsResult<()> {
        self.commands.push(DrawCommand::FillRect { rect, color });
        Ok(())
    }

    fn move_to(&mut self, to: Point) {
        self.commands.push(DrawCommand::MoveTo { to });
    }

    fn line_to(&mut self, to: Point, pen: Pen) -> GraphicsResult<()> {
        self.commands.push(DrawCommand::LineTo { to, pen });
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> GraphicsResult<()> {
        self.commands.push(DrawCommand::Text {
            origin: run.origin,
            text: run.text.to_string(),
            advances: run.advances.to_vec(),
            fore: run.fore,
            back: run.back,
        });
        Ok(())
    }

    fn draw_glyphs(&mut self, run: &GlyphRun<'_>) -> GraphicsResult<()> {
        self.commands.push(DrawCommand::Glyphs {
            origin: run.origin,
            glyphs: run.glyphs.to_vec(),
            advances: run.advances.to_vec(),
            fore: run.fore,
            back: run.back,
            clip: run.clip,
        });
        Ok(())
    }

    fn supports_measurement(&self) -> bool {
        self.metrics.is_some()
    }

    fn font_metrics(&self) -> GraphicsResult<FontMetrics> {
        let (metrics, spec) = self.model("font_metrics")?;
        Ok(metrics.font_metrics(spec))
    }

    fn char_advances(&self, text: &str) -> GraphicsResult<Vec<i32>> {
        let (metrics, spec) = self.model("char_advances")?;
        let advance = metrics.advance_for(spec);
        Ok(text.chars().map(|_| advance).collect())
    }

    fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics> {
        let (metrics, spec) = self.model("glyph_metrics")?;
        Ok(metrics.glyph_metrics(spec, glyph))
    }

    fn font_table(&self, tag: [u8; 4]) -> GraphicsResult<Option<Vec<u8>>> {
        let (metrics, _) = self.model("font_table")?;
        Ok(metrics.table(tag))
    }

    fn glyph_contour_points(&self, glyph: u16) -> GraphicsResult<Vec<Point>> {
        let (metrics, spec) = self.model("glyph_contour_points")?;
        Ok(metrics.contour_points(spec, glyph))
    }
}
