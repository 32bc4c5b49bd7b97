//! Rectangles, lines, dashed rules and the clip stack.

use super::{ClipFrame, VwGraphics};
use crate::dash::DashPattern;
use crate::error::{GraphicsError, GraphicsResult};
use crate::geometry::{Point, Rect};
use crate::style::Pen;
use crate::surface::DrawingSurface;

impl<S: DrawingSurface> VwGraphics<S> {
    /// Fill a rectangle with the background color.
    ///
    /// Nothing reaches the device when the rectangle misses the clip or the
    /// background is transparent.
    pub fn draw_rectangle(&mut self, left: i32, top: i32, right: i32, bottom: i32) -> GraphicsResult<()> {
        let rect = Rect::new(left, top, right, bottom).normalized();
        let clip = self.clip_rect()?;
        if !rect.intersects(&clip) {
            return Ok(());
        }
        let Some(color) = self.state.back_color.opaque() else {
            return Ok(());
        };
        self.draw_device()?.fill_rect(rect.intersect(&clip), color)
    }

    /// Draw a line in the foreground color, one unit thick per 96 units per inch.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> GraphicsResult<()> {
        let clip = self.clip_rect()?;
        if (y0 < clip.top && y1 < clip.top) || (y0 > clip.bottom && y1 > clip.bottom) {
            return Ok(());
        }
        let pen = Pen {
            color: self.state.fore_color,
            width: self.line_thickness()?,
        };
        let device = self.draw_device()?;
        device.move_to(Point::new(x0, y0));
        device.line_to(Point::new(x1, y1), pen)
    }

    pub fn draw_horizontal_line(
        &mut self,
        left: i32,
        right: i32,
        y: i32,
        thickness: i32,
        pattern: &[i32],
        running_offset: &mut i32,
    ) -> GraphicsResult<()> {
        if thickness < 0 {
            return Err(GraphicsError::InvalidArgument(format!(
                "negative line thickness {}",
                thickness
            )));
        }
        let (left, right) = if left <= right { (left, right) } else { (right, left) };
        let dash = DashPattern::new(pattern);
        let start_phase = *running_offset;
        if let Some(dash) = &dash {
            *running_offset = dash.advance(start_phase, right as i64 - left as i64);
        }
        if thickness == 0 || left == right {
            return Ok(());
        }
        let clip = self.clip_rect()?;
        if y + thickness <= clip.top || y >= clip.bottom {
            return Ok(());
        }
        // Only the part of the rule inside the clip is walked.
        let (from, to) = (left.max(clip.left), right.min(clip.right));
        if from >= to {
            return Ok(());
        }
        let spans = match &dash {
            Some(dash) => {
                let phase = dash.advance(start_phase, from as i64 - left as i64);
                dash.spans(from, to, phase).0
            }
            None => vec![(from, to)],
        };
        let color = self.state.fore_color;
        let device = self.draw_device()?;
        for (start, end) in spans {
            let rect = Rect::new(start, y, end, y + thickness).intersect(&clip);
            if !rect.is_empty() {
                device.fill_rect(rect, color)?;
            }
        }
        Ok(())
    }

    /// The effective clip: the override when one is set, otherwise the device's.
    pub fn clip_rect(&self) -> GraphicsResult<Rect> {
        if let Some(clip) = self.state.clip_override {
            return Ok(clip);
        }
        let draw = self.draw.as_ref().ok_or(GraphicsError::NotInitialized)?;
        Ok(draw.surface.clip_box())
    }

    pub fn set_clip_rect_override(&mut self, clip: Option<Rect>) {
        self.state.clip_override = clip.map(Rect::normalized);
    }

    pub fn push_clip_rect(&mut self, rect: Rect) -> GraphicsResult<()> {
        let rect = rect.normalized();
        let clip_override = self.state.clip_override;
        let device = self.draw_device()?;
        let region = device.clip_region();
        let narrowed = match region {
            Some(current) => current.intersect(&rect),
            None => rect,
        };
        device.set_clip_region(Some(narrowed));
        self.state.clip_override = clip_override.map(|c| c.intersect(&rect));
        self.clip_stack.push(ClipFrame {
            region,
            clip_override,
        });
        Ok(())
    }

    pub fn pop_clip_rect(&mut self) -> GraphicsResult<()> {
        let Some(frame) = self.clip_stack.pop() else {
            panic!("pop_clip_rect called with no clip rectangle pushed");
        };
        self.state.clip_override = frame.clip_override;
        self.draw_device()?.set_clip_region(frame.region);
        Ok(())
    }
}
