//! Pixel back-end: a tiny-skia pixmap with fonts from fontdb.

mod outline;

use crate::error::{GraphicsError, GraphicsResult};
use crate::font_config::{family_for, ResolvedFontConfig};
use crate::geometry::{Point, Rect};
use crate::style::{BackColor, FontSpec, Pen, Rgb};
use crate::surface::{DrawingSurface, FontId, FontMetrics, GlyphMetrics, GlyphRun, SavedState, TextRun};
use outline::{ContourPoints, GlyphPathBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Stroke, Transform};
use ttf_parser::GlyphId;

/// Maximum surface dimension in pixels.
const MAX_DIMENSION: u32 = 32767;

/// Horizontal shear applied to upright faces asked to render italic.
const SYNTHETIC_ITALIC_SKEW: f32 = 0.2;

/// Raw font file bytes and the face index within the file.
struct FaceData {
    data: Vec<u8>,
    index: u32,
}

#[derive(Clone)]
struct LoadedFont {
    face: Arc<FaceData>,
    height: i32,
    synthetic_bold: bool,
    synthetic_italic: bool,
}

impl LoadedFont {
    fn parse(&self) -> GraphicsResult<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.face.data, self.face.index)
            .map_err(|e| GraphicsError::FontParseError(e.to_string()))
    }

    fn scale(&self, face: &ttf_parser::Face<'_>) -> f32 {
        self.height as f32 / face.units_per_em().max(1) as f32
    }
}

/// A drawing surface that rasterizes into an RGBA pixmap.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixmap: Pixmap,
    dpi: (u32, u32),
    fontdb: Arc<fontdb::Database>,
    fallback_face: String,
    face_cache: HashMap<fontdb::ID, Arc<FaceData>>,
    fonts: HashMap<FontId, LoadedFont>,
    next_font: u32,
    selected: Option<FontId>,
    clip: Option<Rect>,
    saved: Vec<(Option<Rect>, Option<FontId>)>,
    position: Point,
}

impl RasterSurface {
    /// Create a transparent surface of `width` x `height` pixels at `dpi`
    /// pixels per inch.
    pub fn new(width: u32, height: u32, dpi: u32, fonts: &ResolvedFontConfig) -> GraphicsResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION || dpi == 0 {
            return Err(GraphicsError::InvalidDimensions { width, height });
        }
        let pixmap = Pixmap::new(width, height).ok_or(GraphicsError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            pixmap,
            dpi: (dpi, dpi),
            fontdb: fonts.fontdb.clone(),
            fallback_face: fonts.fallback_face.clone(),
            face_cache: HashMap::new(),
            fonts: HashMap::new(),
            next_font: 1,
            selected: None,
            clip: None,
            saved: Vec::new(),
            position: Point::new(0, 0),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Fill the whole surface with `color`, ignoring the clip.
    pub fn clear(&mut self, color: Rgb) {
        self.pixmap.fill(color.into());
    }

    /// Straight-alpha RGBA of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the surface as PNG, recording `ppi` (default: the surface
    /// resolution) as pixel density.
    pub fn to_png(&self, ppi: Option<f32>) -> GraphicsResult<Vec<u8>> {
        let ppi = ppi.unwrap_or(self.dpi.0 as f32);
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let ppm = (ppi.max(0.0) / 0.0254).round() as u32;
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));

            let mut writer = encoder.write_header()?;
            let data: Vec<u8> = self
                .pixmap
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .collect();
            writer.write_image_data(&data)?;
        }
        Ok(buf)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    fn selected_font(&self) -> GraphicsResult<&LoadedFont> {
        self.selected
            .and_then(|id| self.fonts.get(&id))
            .ok_or(GraphicsError::NoFontSelected)
    }

    fn paint(color: Rgb, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color.into());
        paint.anti_alias = anti_alias;
        paint
    }

    /// Mask for the current clip narrowed by `extra`; `None` when unclipped.
    fn clip_mask(&self, extra: Option<Rect>) -> Option<Mask> {
        let clip = match (self.clip, extra) {
            (None, None) => return None,
            (Some(a), Some(b)) => a.intersect(&b),
            (Some(a), None) | (None, Some(a)) => a,
        };
        let mut mask = Mask::new(self.width, self.height)?;
        let visible = clip.intersect(&self.bounds());
        if let Some(rect) = to_skia_rect(&visible) {
            let path = PathBuilder::from_rect(rect);
            mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        }
        Some(mask)
    }

    fn fill_clipped(&mut self, rect: Rect, color: Rgb, extra: Option<Rect>) {
        let mut visible = rect.intersect(&self.clip_box());
        if let Some(extra) = extra {
            visible = visible.intersect(&extra);
        }
        if let Some(rect) = to_skia_rect(&visible) {
            self.pixmap
                .fill_rect(rect, &Self::paint(color, false), Transform::identity(), None);
        }
    }

    /// Paint glyph outlines along the baseline starting at `origin` (the top
    /// of the line box), after filling the run's cell when `back` is opaque.
    fn paint_glyphs(
        &mut self,
        origin: Point,
        glyphs: &[(GlyphId, i32)],
        fore: Rgb,
        back: BackColor,
        clip: Option<Rect>,
    ) -> GraphicsResult<()> {
        let font = self.selected_font()?.clone();
        let face = font.parse()?;
        let scale = font.scale(&face);
        let ascent = (face.ascender() as f32 * scale).ceil() as i32;
        let descent = (-(face.descender() as f32) * scale).ceil() as i32;

        if let Some(color) = back.opaque() {
            let width: i32 = glyphs.iter().map(|(_, adv)| adv).sum();
            let cell = Rect::new(origin.x, origin.y, origin.x + width, origin.y + ascent + descent);
            self.fill_clipped(cell, color, clip);
        }

        let mask = self.clip_mask(clip);
        let paint = Self::paint(fore, true);
        let skew = if font.synthetic_italic { SYNTHETIC_ITALIC_SKEW } else { 0.0 };
        let baseline = (origin.y + ascent) as f32;
        let embolden = font.synthetic_bold.then(|| Stroke {
            width: (font.height as f32 / 24.0).max(1.0),
            ..Stroke::default()
        });

        let mut pen_x = origin.x;
        for &(glyph, advance) in glyphs {
            let mut builder = GlyphPathBuilder::new(pen_x as f32, baseline, scale, skew);
            if face.outline_glyph(glyph, &mut builder).is_some() {
                if let Some(path) = builder.finish() {
                    self.pixmap
                        .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), mask.as_ref());
                    if let Some(stroke) = &embolden {
                        self.pixmap
                            .stroke_path(&path, &paint, stroke, Transform::identity(), mask.as_ref());
                    }
                }
            }
            pen_x += advance;
        }
        Ok(())
    }

    fn load_face(&mut self, id: fontdb::ID) -> GraphicsResult<Arc<FaceData>> {
        if let Some(face) = self.face_cache.get(&id) {
            return Ok(face.clone());
        }
        let face = self
            .fontdb
            .with_face_data(id, |data, index| FaceData {
                data: data.to_vec(),
                index,
            })
            .ok_or_else(|| GraphicsError::FontParseError("font data unavailable".to_string()))?;
        ttf_parser::Face::parse(&face.data, face.index)
            .map_err(|e| GraphicsError::FontParseError(e.to_string()))?;
        let face = Arc::new(face);
        self.face_cache.insert(id, face.clone());
        Ok(face)
    }
}

fn to_skia_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    if rect.is_empty() {
        return None;
    }
    tiny_skia::Rect::from_ltrb(
        rect.left as f32,
        rect.top as f32,
        rect.right as f32,
        rect.bottom as f32,
    )
}

impl DrawingSurface for RasterSurface {
    fn units_per_inch(&self) -> (u32, u32) {
        self.dpi
    }

    fn save_state(&mut self) -> SavedState {
        let token = SavedState(self.saved.len() as u32);
        self.saved.push((self.clip, self.selected));
        token
    }

    fn restore_state(&mut self, token: SavedState) {
        let index = token.0 as usize;
        if let Some(&(clip, selected)) = self.saved.get(index) {
            self.saved.truncate(index);
            self.clip = clip;
            self.selected = selected;
        }
    }

    fn clip_box(&self) -> Rect {
        match self.clip {
            Some(clip) => clip.intersect(&self.bounds()),
            None => self.bounds(),
        }
    }

    fn clip_region(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip_region(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    fn create_font(&mut self, spec: &FontSpec) -> GraphicsResult<FontId> {
        let families = [family_for(&spec.face_name), family_for(&self.fallback_face)];
        let query = fontdb::Query {
            families: &families,
            weight: if spec.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if spec.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let id = self.fontdb.query(&query).ok_or_else(|| GraphicsError::FontCreation {
            face: spec.face_name.clone(),
            reason: "no matching face".to_string(),
        })?;
        let (weight, style) = self
            .fontdb
            .face(id)
            .map(|info| (info.weight, info.style))
            .unwrap_or((fontdb::Weight::NORMAL, fontdb::Style::Normal));
        let face = self.load_face(id)?;

        let font = FontId(self.next_font);
        self.next_font += 1;
        self.fonts.insert(
            font,
            LoadedFont {
                face,
                height: spec.height.max(1),
                synthetic_bold: spec.bold && weight < fontdb::Weight::SEMIBOLD,
                synthetic_italic: spec.italic && style == fontdb::Style::Normal,
            },
        );
        log::debug!(target: "vwgraphics", "raster font {:?} for '{}'", font, spec.face_name);
        Ok(font)
    }

    fn select_font(&mut self, font: Option<FontId>) -> Option<FontId> {
        std::mem::replace(&mut self.selected, font)
    }

    fn delete_font(&mut self, font: FontId) {
        self.fonts.remove(&font);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) -> GraphicsResult<()> {
        self.fill_clipped(rect.normalized(), color, None);
        Ok(())
    }

    fn move_to(&mut self, to: Point) {
        self.position = to;
    }

    fn line_to(&mut self, to: Point, pen: Pen) -> GraphicsResult<()> {
        let from = std::mem::replace(&mut self.position, to);
        // Odd widths are centered on pixel centers so they stay crisp.
        let half = if pen.width % 2 == 1 { 0.5 } else { 0.0 };
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32 + half, from.y as f32 + half);
        pb.line_to(to.x as f32 + half, to.y as f32 + half);
        let Some(path) = pb.finish() else {
            return Ok(());
        };
        let stroke = Stroke {
            width: pen.width.max(1) as f32,
            ..Stroke::default()
        };
        let mask = self.clip_mask(None);
        self.pixmap.stroke_path(
            &path,
            &Self::paint(pen.color, false),
            &stroke,
            Transform::identity(),
            mask.as_ref(),
        );
        Ok(())
    }

    fn draw_text(&mut self, run: &TextRun<'_>) -> GraphicsResult<()> {
        let glyphs: Vec<(GlyphId, i32)> = {
            let face = self.selected_font()?.parse()?;
            run.text
                .chars()
                .zip(run.advances.iter().copied())
                .map(|(ch, adv)| (face.glyph_index(ch).unwrap_or(GlyphId(0)), adv))
                .collect()
        };
        self.paint_glyphs(run.origin, &glyphs, run.fore, run.back, None)
    }

    fn draw_glyphs(&mut self, run: &GlyphRun<'_>) -> GraphicsResult<()> {
        let glyphs: Vec<(GlyphId, i32)> = run
            .glyphs
            .iter()
            .zip(run.advances.iter().copied())
            .map(|(&g, adv)| (GlyphId(g), adv))
            .collect();
        self.paint_glyphs(run.origin, &glyphs, run.fore, run.back, run.clip)
    }

    fn supports_measurement(&self) -> bool {
        true
    }

    fn font_metrics(&self) -> GraphicsResult<FontMetrics> {
        let font = self.selected_font()?;
        let face = font.parse()?;
        let scale = font.scale(&face);
        let break_char = if face.glyph_index(' ').is_some() { ' ' } else { '\u{a0}' };
        Ok(FontMetrics {
            ascent: (face.ascender() as f32 * scale).ceil() as i32,
            descent: (-(face.descender() as f32) * scale).ceil() as i32,
            external_leading: (face.line_gap() as f32 * scale).round() as i32,
            em_square: u32::from(face.units_per_em()),
            break_char,
        })
    }

    fn char_advances(&self, text: &str) -> GraphicsResult<Vec<i32>> {
        let font = self.selected_font()?;
        let face = font.parse()?;
        let scale = font.scale(&face);
        Ok(text
            .chars()
            .map(|ch| {
                let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
                (face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale).round() as i32
            })
            .collect())
    }

    fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics> {
        let font = self.selected_font()?;
        let face = font.parse()?;
        if glyph >= face.number_of_glyphs() {
            return Err(GraphicsError::GlyphNotFound(glyph));
        }
        let scale = font.scale(&face);
        let id = GlyphId(glyph);
        let advance_x = (face.glyph_hor_advance(id).unwrap_or(0) as f32 * scale).round() as i32;
        let Some(bbox) = face.glyph_bounding_box(id) else {
            return Ok(GlyphMetrics {
                advance_x,
                ..GlyphMetrics::default()
            });
        };
        let left = (bbox.x_min as f32 * scale).floor() as i32;
        let right = (bbox.x_max as f32 * scale).ceil() as i32;
        let top = (bbox.y_max as f32 * scale).ceil() as i32;
        let bottom = (bbox.y_min as f32 * scale).floor() as i32;
        Ok(GlyphMetrics {
            black_box_width: right - left,
            black_box_height: top - bottom,
            origin_x: left,
            origin_y: top,
            advance_x,
            advance_y: 0,
        })
    }

    fn font_table(&self, tag: [u8; 4]) -> GraphicsResult<Option<Vec<u8>>> {
        let font = self.selected_font()?;
        let face = font.parse()?;
        Ok(face
            .raw_face()
            .table(ttf_parser::Tag::from_bytes(&tag))
            .map(|data| data.to_vec()))
    }

    fn glyph_contour_points(&self, glyph: u16) -> GraphicsResult<Vec<Point>> {
        let font = self.selected_font()?;
        let face = font.parse()?;
        if glyph >= face.number_of_glyphs() {
            return Err(GraphicsError::GlyphNotFound(glyph));
        }
        let mut points = ContourPoints::new(font.scale(&face));
        // Glyphs without an outline (spaces) have no contour points.
        face.outline_glyph(GlyphId(glyph), &mut points);
        Ok(points.points)
    }
}
