//! Glyph outline adapters for ttf-parser.

use crate::geometry::Point;
use tiny_skia::PathBuilder;

/// Builds a device-space path from a glyph outline.
///
/// Font units are scaled by `scale`, flipped so y grows downward, skewed by
/// `skew` (synthetic italic) and placed with the baseline origin at (`x`, `y`).
pub(crate) struct GlyphPathBuilder {
    builder: PathBuilder,
    x: f32,
    y: f32,
    scale: f32,
    skew: f32,
}

impl GlyphPathBuilder {
    pub(crate) fn new(x: f32, y: f32, scale: f32, skew: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            x,
            y,
            scale,
            skew,
        }
    }

    fn map(&self, gx: f32, gy: f32) -> (f32, f32) {
        (
            self.x + (gx + gy * self.skew) * self.scale,
            self.y - gy * self.scale,
        )
    }

    pub(crate) fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl ttf_parser::OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Collects the on- and off-curve points of an outline in outline order,
/// scaled to device units relative to the glyph origin.
pub(crate) struct ContourPoints {
    scale: f32,
    pub(crate) points: Vec<Point>,
}

impl ContourPoints {
    pub(crate) fn new(scale: f32) -> Self {
        Self {
            scale,
            points: Vec::new(),
        }
    }

    fn push(&mut self, x: f32, y: f32) {
        self.points.push(Point::new(
            (x * self.scale).round() as i32,
            (-y * self.scale).round() as i32,
        ));
    }
}

impl ttf_parser::OutlineBuilder for ContourPoints {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.push(x1, y1);
        self.push(x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.push(x1, y1);
        self.push(x2, y2);
        self.push(x, y);
    }

    fn close(&mut self) {}
}
