//! The drawing and text-measurement engine.

mod drawing;
mod text_rendering;

use crate::drawing_state::{BoundDevice, DrawingState};
use crate::error::{GraphicsError, GraphicsResult};
use crate::geometry::{Point, Rect, Size};
use crate::style::{BackColor, CharRenderProps, Rgb};
use crate::surface::{DrawingSurface, GlyphMetrics};

/// Device units per inch that correspond to a one-unit line.
const LINE_THICKNESS_DPI: u32 = 96;

/// Options for [`Graphics::draw_glyph_run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphRunOptions {
    /// Fill the run's cell with the current background color first.
    pub opaque: bool,
    /// Restrict output to the clip rectangle passed alongside the run.
    pub clipped: bool,
}

/// One saved clip, restored by [`Graphics::pop_clip_rect`].
#[derive(Debug, Clone, Copy)]
struct ClipFrame {
    region: Option<Rect>,
    clip_override: Option<Rect>,
}

/// Drawing and measurement capability leased to layout boxes.
///
/// Coordinates are device units. Lines, rectangles and text are clipped
/// against [`Graphics::clip_rect`] before reaching the device.
pub trait Graphics {
    fn set_fore_color(&mut self, color: Rgb);
    fn set_back_color(&mut self, color: BackColor);

    /// Apply colors and, when the font subset of `props` changed, select a new font.
    fn setup_graphics(&mut self, props: &CharRenderProps) -> GraphicsResult<()>;

    fn draw_rectangle(&mut self, left: i32, top: i32, right: i32, bottom: i32) -> GraphicsResult<()>;
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> GraphicsResult<()>;

    /// Draw a horizontal rule from `left` to `right`, dashed by `pattern`.
    ///
    /// `running_offset` is the dash phase at `left` on input and the phase at
    /// `right` on output, so adjacent calls continue the same dash sequence.
    fn draw_horizontal_line(
        &mut self,
        left: i32,
        right: i32,
        y: i32,
        thickness: i32,
        pattern: &[i32],
        running_offset: &mut i32,
    ) -> GraphicsResult<()>;

    /// Draw `text` with its top-left at (`x`, `y`), adding `stretch` units
    /// distributed over the font's break characters.
    fn draw_text(&mut self, x: i32, y: i32, text: &str, stretch: i32) -> GraphicsResult<()>;

    fn draw_glyph_run(
        &mut self,
        x: i32,
        y: i32,
        glyphs: &[u16],
        options: GlyphRunOptions,
        clip: Option<Rect>,
        advances: Option<&[i32]>,
    ) -> GraphicsResult<()>;

    fn measure_text(&mut self, text: &str) -> GraphicsResult<Size>;

    /// Width of the first `char_index` characters of `text` drawn with `stretch`.
    fn measure_leading_width(&mut self, text: &str, char_index: usize, stretch: i32) -> GraphicsResult<i32>;

    fn font_ascent(&mut self) -> GraphicsResult<i32>;
    fn font_descent(&mut self) -> GraphicsResult<i32>;

    fn clip_rect(&self) -> GraphicsResult<Rect>;

    /// Report `clip` from [`Graphics::clip_rect`] instead of the device clip.
    fn set_clip_rect_override(&mut self, clip: Option<Rect>);

    /// Save the current clip and intersect it with `rect`.
    fn push_clip_rect(&mut self, rect: Rect) -> GraphicsResult<()>;

    /// Restore the clip saved by the matching [`Graphics::push_clip_rect`].
    ///
    /// # Panics
    ///
    /// Panics when no clip is pushed.
    fn pop_clip_rect(&mut self) -> GraphicsResult<()>;

    fn font_em_square(&self) -> GraphicsResult<u32>;
    fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics>;

    /// Copy the font table `tag` into `buffer`, returning the bytes written.
    fn font_table(&self, tag: [u8; 4], buffer: &mut [u8]) -> GraphicsResult<usize>;
    fn font_table_size(&self, tag: [u8; 4]) -> GraphicsResult<usize>;
    fn glyph_contour_point(&self, glyph: u16, point_index: usize) -> GraphicsResult<Point>;

    fn x_units_per_inch(&self) -> GraphicsResult<u32>;
    fn y_units_per_inch(&self) -> GraphicsResult<u32>;

    /// Override the horizontal resolution; 0 restores the device value.
    fn set_x_units_per_inch(&mut self, dpi: u32);
    /// Override the vertical resolution; 0 restores the device value.
    fn set_y_units_per_inch(&mut self, dpi: u32);
}

/// Graphics engine bound to a drawing surface and, optionally, a separate
/// measuring surface.
pub struct VwGraphics<S: DrawingSurface> {
    draw: Option<BoundDevice<S>>,
    /// Separate measuring device; `None` measures on the draw device.
    measure: Option<BoundDevice<Box<dyn DrawingSurface>>>,
    state: DrawingState,
    clip_stack: Vec<ClipFrame>,
    x_dpi_override: u32,
    y_dpi_override: u32,
}

impl<S: DrawingSurface> Default for VwGraphics<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DrawingSurface> VwGraphics<S> {
    /// Create an unbound engine.
    pub fn new() -> Self {
        Self {
            draw: None,
            measure: None,
            state: DrawingState::default(),
            clip_stack: Vec::new(),
            x_dpi_override: 0,
            y_dpi_override: 0,
        }
    }

    /// Create an engine bound to `surface`.
    pub fn with_surface(surface: S) -> Self {
        let mut gr = Self::new();
        gr.draw = Some(BoundDevice::bind(surface));
        gr
    }

    /// Bind `surface` for both drawing and measurement.
    pub fn initialize(&mut self, surface: S) -> GraphicsResult<()> {
        if self.draw.is_some() {
            return Err(GraphicsError::AlreadyInitialized);
        }
        log::debug!(target: "vwgraphics", "binding drawing surface");
        self.draw = Some(BoundDevice::bind(surface));
        self.state.font_spec = None;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.draw.is_some()
    }

    /// Measure on `surface` instead of the draw surface (`None` reverts).
    ///
    /// The currently cached font is recreated on the new measuring device.
    pub fn set_measure_surface(&mut self, surface: Option<Box<dyn DrawingSurface>>) -> GraphicsResult<()> {
        if self.draw.is_none() {
            return Err(GraphicsError::NotInitialized);
        }
        if let Some(previous) = self.measure.take() {
            drop(previous.unwind());
        }
        let Some(surface) = surface else {
            return Ok(());
        };
        let mut bound = BoundDevice::bind(surface);
        let result = match &self.state.font_spec {
            Some(spec) => bound.install_font(spec),
            None => Ok(()),
        };
        self.measure = Some(bound);
        if result.is_err() {
            self.state.font_spec = None;
        }
        result
    }

    /// Restore every device to the state it was bound in and return the draw
    /// surface. Returns `None` when nothing is bound.
    ///
    /// # Panics
    ///
    /// Panics when clip rectangles are still pushed.
    pub fn release_device(&mut self) -> Option<S> {
        let draw = self.draw.take()?;
        assert!(
            self.clip_stack.is_empty(),
            "release_device called with {} clip rectangle(s) still pushed",
            self.clip_stack.len()
        );
        if let Some(measure) = self.measure.take() {
            drop(measure.unwind());
        }
        self.state.font_spec = None;
        self.state.clip_override = None;
        log::debug!(target: "vwgraphics", "released drawing surface");
        Some(draw.unwind())
    }

    /// The bound draw surface.
    pub fn surface(&self) -> Option<&S> {
        self.draw.as_ref().map(|d| &d.surface)
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.draw.as_mut().map(|d| &mut d.surface)
    }

    /// Colors, cached font and clip override currently in effect.
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Number of clip rectangles currently pushed.
    pub fn clip_depth(&self) -> usize {
        self.clip_stack.len()
    }

    pub(crate) fn draw_device(&mut self) -> GraphicsResult<&mut S> {
        self.draw
            .as_mut()
            .map(|d| &mut d.surface)
            .ok_or(GraphicsError::NotInitialized)
    }

    pub(crate) fn measure_device(&self) -> GraphicsResult<&dyn DrawingSurface> {
        if let Some(measure) = &self.measure {
            return Ok(&*measure.surface);
        }
        match &self.draw {
            Some(draw) => Ok(&draw.surface),
            None => Err(GraphicsError::NotInitialized),
        }
    }

    fn line_thickness(&self) -> GraphicsResult<i32> {
        let dpi = self.x_units_per_inch()?;
        Ok(((dpi + LINE_THICKNESS_DPI / 2) / LINE_THICKNESS_DPI).max(1) as i32)
    }

    pub fn set_fore_color(&mut self, color: Rgb) {
        self.state.fore_color = color;
    }

    pub fn set_back_color(&mut self, color: BackColor) {
        self.state.back_color = color;
    }

    pub fn setup_graphics(&mut self, props: &CharRenderProps) -> GraphicsResult<()> {
        self.state.fore_color = props.fore_color;
        self.state.back_color = props.back_color;
        let spec = props.font_spec(self.font_units_per_inch()?);
        if self.state.font_spec.as_ref() == Some(&spec) {
            return Ok(());
        }
        log::debug!(
            target: "vwgraphics",
            "selecting font '{}' height={} bold={} italic={}",
            spec.face_name, spec.height, spec.bold, spec.italic
        );
        // Forget the cached spec first so a failure below forces a retry.
        self.state.font_spec = None;
        self.draw
            .as_mut()
            .ok_or(GraphicsError::NotInitialized)?
            .install_font(&spec)?;
        if let Some(measure) = self.measure.as_mut() {
            measure.install_font(&spec)?;
        }
        self.state.font_spec = Some(spec);
        Ok(())
    }

    /// Vertical resolution fonts are sized for: the override when set, else
    /// the measuring device's.
    fn font_units_per_inch(&self) -> GraphicsResult<u32> {
        if self.y_dpi_override > 0 {
            return Ok(self.y_dpi_override);
        }
        Ok(self.measure_device()?.units_per_inch().1)
    }

    pub fn x_units_per_inch(&self) -> GraphicsResult<u32> {
        if self.x_dpi_override > 0 {
            return Ok(self.x_dpi_override);
        }
        let draw = self.draw.as_ref().ok_or(GraphicsError::NotInitialized)?;
        Ok(draw.surface.units_per_inch().0)
    }

    pub fn y_units_per_inch(&self) -> GraphicsResult<u32> {
        if self.y_dpi_override > 0 {
            return Ok(self.y_dpi_override);
        }
        let draw = self.draw.as_ref().ok_or(GraphicsError::NotInitialized)?;
        Ok(draw.surface.units_per_inch().1)
    }

    pub fn set_x_units_per_inch(&mut self, dpi: u32) {
        self.x_dpi_override = dpi;
    }

    pub fn set_y_units_per_inch(&mut self, dpi: u32) {
        self.y_dpi_override = dpi;
    }
}

impl<S: DrawingSurface> Drop for VwGraphics<S> {
    fn drop(&mut self) {
        if self.draw.is_some() && !std::thread::panicking() {
            self.clip_stack.clear();
            drop(self.release_device());
        }
    }
}

impl<S: DrawingSurface> Graphics for VwGraphics<S> {
    fn set_fore_color(&mut self, color: Rgb) {
        VwGraphics::set_fore_color(self, color)
    }

    fn set_back_color(&mut self, color: BackColor) {
        VwGraphics::set_back_color(self, color)
    }

    fn setup_graphics(&mut self, props: &CharRenderProps) -> GraphicsResult<()> {
        VwGraphics::setup_graphics(self, props)
    }

    fn draw_rectangle(&mut self, left: i32, top: i32, right: i32, bottom: i32) -> GraphicsResult<()> {
        VwGraphics::draw_rectangle(self, left, top, right, bottom)
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> GraphicsResult<()> {
        VwGraphics::draw_line(self, x0, y0, x1, y1)
    }

    fn draw_horizontal_line(
        &mut self,
        left: i32,
        right: i32,
        y: i32,
        thickness: i32,
        pattern: &[i32],
        running_offset: &mut i32,
    ) -> GraphicsResult<()> {
        VwGraphics::draw_horizontal_line(self, left, right, y, thickness, pattern, running_offset)
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, stretch: i32) -> GraphicsResult<()> {
        VwGraphics::draw_text(self, x, y, text, stretch)
    }

    fn draw_glyph_run(
        &mut self,
        x: i32,
        y: i32,
        glyphs: &[u16],
        options: GlyphRunOptions,
        clip: Option<Rect>,
        advances: Option<&[i32]>,
    ) -> GraphicsResult<()> {
        VwGraphics::draw_glyph_run(self, x, y, glyphs, options, clip, advances)
    }

    fn measure_text(&mut self, text: &str) -> GraphicsResult<Size> {
        VwGraphics::measure_text(self, text)
    }

    fn measure_leading_width(&mut self, text: &str, char_index: usize, stretch: i32) -> GraphicsResult<i32> {
        VwGraphics::measure_leading_width(self, text, char_index, stretch)
    }

    fn font_ascent(&mut self) -> GraphicsResult<i32> {
        VwGraphics::font_ascent(self)
    }

    fn font_descent(&mut self) -> GraphicsResult<i32> {
        VwGraphics::font_descent(self)
    }

    fn clip_rect(&self) -> GraphicsResult<Rect> {
        VwGraphics::clip_rect(self)
    }

    fn set_clip_rect_override(&mut self, clip: Option<Rect>) {
        VwGraphics::set_clip_rect_override(self, clip)
    }

    fn push_clip_rect(&mut self, rect: Rect) -> GraphicsResult<()> {
        VwGraphics::push_clip_rect(self, rect)
    }

    fn pop_clip_rect(&mut self) -> GraphicsResult<()> {
        VwGraphics::pop_clip_rect(self)
    }

    fn font_em_square(&self) -> GraphicsResult<u32> {
        VwGraphics::font_em_square(self)
    }

    fn glyph_metrics(&self, glyph: u16) -> GraphicsResult<GlyphMetrics> {
        VwGraphics::glyph_metrics(self, glyph)
    }

    fn font_table(&self, tag: [u8; 4], buffer: &mut [u8]) -> GraphicsResult<usize> {
        VwGraphics::font_table(self, tag, buffer)
    }

    fn font_table_size(&self, tag: [u8; 4]) -> GraphicsResult<usize> {
        VwGraphics::font_table_size(self, tag)
    }

    fn glyph_contour_point(&self, glyph: u16, point_index: usize) -> GraphicsResult<Point> {
        VwGraphics::glyph_contour_point(self, glyph, point_index)
    }

    fn x_units_per_inch(&self) -> GraphicsResult<u32> {
        VwGraphics::x_units_per_inch(self)
    }

    fn y_units_per_inch(&self) -> GraphicsResult<u32> {
        VwGraphics::y_units_per_inch(self)
    }

    fn set_x_units_per_inch(&mut self, dpi: u32) {
        VwGraphics::set_x_units_per_inch(self, dpi)
    }

    fn set_y_units_per_inch(&mut self, dpi: u32) {
        VwGraphics::set_y_units_per_inch(self, dpi)
    }
}
