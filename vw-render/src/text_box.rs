//! A plain-text layout box: one paragraph per input line, wrapped at spaces.
//!
//! Paragraphs start as lazy placeholders one line high and are wrapped only
//! when prepared for drawing, so opening a long document measures nothing
//! beyond the first screen.

use vw_graphics::{BackColor, CharRenderProps, CoordRects, Graphics, Point, Rect, Rgb};
use vw_view::{
    LayoutBox, LazyExpansion, PrepareOutcome, Selection, SelectionLocation, SelectionState, TextPos,
    TextPropChanges, ViewError, ViewResult,
};

const HIGHLIGHT: Rgb = Rgb::from_u32(0x99c8ff);
const INACTIVE_HIGHLIGHT: Rgb = Rgb::from_u32(0xd8d8d8);

/// A wrapped line as a range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct Paragraph {
    text: String,
    props: CharRenderProps,
    line_height: i32,
    /// `None` while lazy.
    lines: Option<Vec<Line>>,
}

impl Paragraph {
    fn height(&self) -> i32 {
        match &self.lines {
            Some(lines) => lines.len().max(1) as i32 * self.line_height,
            None => self.line_height,
        }
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn line_text(&self, line: Line) -> String {
        self.text.chars().skip(line.start).take(line.end - line.start).collect()
    }

    /// Index of the wrapped line holding character `offset`.
    fn line_index(lines: &[Line], offset: usize) -> usize {
        lines.iter().rposition(|line| line.start <= offset).unwrap_or(0)
    }
}

fn word_end(text: &[char], from: usize) -> usize {
    let mut i = from;
    while i < text.len() && text[i] != ' ' {
        i += 1;
    }
    i
}

fn skip_spaces(text: &[char], from: usize) -> usize {
    let mut i = from;
    while i < text.len() && text[i] == ' ' {
        i += 1;
    }
    i
}

/// Greedy word wrap. A word wider than `width` gets a line of its own.
fn wrap(gr: &mut dyn Graphics, text: &str, width: i32) -> ViewResult<Vec<Line>> {
    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = word_end(&chars, start);
        loop {
            let next_start = skip_spaces(&chars, end);
            if next_start >= chars.len() {
                break;
            }
            let next_end = word_end(&chars, next_start);
            let candidate: String = chars[start..next_end].iter().collect();
            if gr.measure_text(&candidate)?.width > width {
                break;
            }
            end = next_end;
        }
        lines.push(Line { start, end });
        start = skip_spaces(&chars, end);
    }
    if lines.is_empty() {
        lines.push(Line { start: 0, end: 0 });
    }
    Ok(lines)
}

/// Character index in `text` nearest to `x` layout units from its start.
fn char_at(gr: &mut dyn Graphics, text: &str, x: i32) -> ViewResult<usize> {
    let count = text.chars().count();
    let mut previous = 0;
    for k in 1..=count {
        let width = gr.measure_leading_width(text, k, 0)?;
        if x < (previous + width) / 2 {
            return Ok(k - 1);
        }
        previous = width;
    }
    Ok(count)
}

/// Laid-out plain text with a single selection.
#[derive(Debug, Clone)]
pub struct TextBox {
    paragraphs: Vec<Paragraph>,
    width: i32,
    selection: Option<Selection>,
    state: SelectionState,
}

impl TextBox {
    pub fn new(text: &str, props: CharRenderProps) -> Self {
        let mut paragraphs: Vec<Paragraph> = text
            .lines()
            .map(|line| Paragraph {
                text: line.to_string(),
                props: props.clone(),
                line_height: 0,
                lines: None,
            })
            .collect();
        if paragraphs.is_empty() {
            paragraphs.push(Paragraph {
                text: String::new(),
                props,
                line_height: 0,
                lines: None,
            });
        }
        Self {
            paragraphs,
            width: 0,
            selection: None,
            state: SelectionState::Disabled,
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// How many paragraphs are currently wrapped rather than lazy.
    pub fn materialized_count(&self) -> usize {
        self.paragraphs.iter().filter(|p| p.lines.is_some()).count()
    }

    /// Range selection over the first occurrence of `term`.
    pub fn find(&self, term: &str) -> Option<Selection> {
        if term.is_empty() {
            return None;
        }
        self.paragraphs.iter().enumerate().find_map(|(index, para)| {
            let byte = para.text.find(term)?;
            let start = para.text[..byte].chars().count();
            let end = start + term.chars().count();
            Some(Selection::range(TextPos::new(index, start), TextPos::new(index, end)))
        })
    }

    fn clamp_pos(&self, pos: TextPos) -> TextPos {
        let para = pos.para.min(self.paragraphs.len() - 1);
        let offset = pos.offset.min(self.paragraphs[para].char_count());
        TextPos::new(para, offset)
    }

    fn para_top(&self, index: usize) -> i32 {
        self.paragraphs[..index].iter().map(Paragraph::height).sum()
    }

    /// One unit wide rectangle at `pos`, in layout units.
    fn caret_rect(&self, gr: &mut dyn Graphics, pos: TextPos) -> ViewResult<Rect> {
        let pos = self.clamp_pos(pos);
        let para = &self.paragraphs[pos.para];
        let top = self.para_top(pos.para);
        let Some(lines) = &para.lines else {
            return Ok(Rect::new(0, top, 1, top + para.height()));
        };
        let index = Paragraph::line_index(lines, pos.offset);
        let line = lines[index];
        gr.setup_graphics(&para.props)?;
        let text = para.line_text(line);
        let x = gr.measure_leading_width(&text, pos.offset.min(line.end) - line.start, 0)?;
        let y = top + index as i32 * para.line_height;
        Ok(Rect::new(x, y, x + 1, y + para.line_height))
    }

    /// Paragraph and line under layout `y`, if wrapped.
    fn hit_line(&self, y: i32) -> Option<(usize, usize)> {
        let mut top = 0;
        for (index, para) in self.paragraphs.iter().enumerate() {
            let bottom = top + para.height();
            if y >= top && y < bottom {
                let lines = para.lines.as_ref()?;
                let line = ((y - top) / para.line_height.max(1)) as usize;
                return Some((index, line.min(lines.len() - 1)));
            }
            top = bottom;
        }
        None
    }

    /// Paint the selected part of `line` of paragraph `index`.
    #[allow(clippy::too_many_arguments)]
    fn draw_line_selection(
        &self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        index: usize,
        line: Line,
        text: &str,
        y: i32,
        selection: Selection,
    ) -> ViewResult<()> {
        let para = &self.paragraphs[index];
        let (start, limit) = (selection.start(), selection.limit());
        let line_start = TextPos::new(index, line.start);
        let line_end = TextPos::new(index, line.end);
        let (top, bottom) = (coords.to_dst_y(y), coords.to_dst_y(y + para.line_height));

        if !selection.is_range() {
            if self.state == SelectionState::Enabled && start >= line_start && start <= line_end {
                let x = coords.to_dst_x(0) + gr.measure_leading_width(text, start.offset - line.start, 0)?;
                gr.set_back_color(BackColor::Color(para.props.fore_color));
                gr.draw_rectangle(x, top, x + 1, bottom)?;
            }
            return Ok(());
        }

        if limit <= line_start || start > line_end {
            return Ok(());
        }
        let from = if start < line_start { line.start } else { start.offset };
        let to = if limit > line_end { line.end } else { limit.offset };
        if from >= to {
            return Ok(());
        }
        let color = match self.state {
            SelectionState::Enabled => HIGHLIGHT,
            _ => INACTIVE_HIGHLIGHT,
        };
        // Text is drawn from the line origin with device advances.
        let origin = coords.to_dst_x(0);
        let x0 = origin + gr.measure_leading_width(text, from - line.start, 0)?;
        let x1 = origin + gr.measure_leading_width(text, to - line.start, 0)?;
        gr.set_back_color(BackColor::Color(color));
        gr.draw_rectangle(x0, top, x1, bottom)?;
        Ok(())
    }
}

impl LayoutBox for TextBox {
    fn layout(&mut self, gr: &mut dyn Graphics, width: i32) -> ViewResult<()> {
        if width <= 0 {
            return Err(ViewError::Layout(format!("cannot lay out text to width {}", width)));
        }
        self.width = width;
        let mut cached: Option<(CharRenderProps, i32)> = None;
        for para in &mut self.paragraphs {
            if cached.as_ref().map_or(true, |(props, _)| *props != para.props) {
                gr.setup_graphics(&para.props)?;
                let height = gr.font_ascent()? + gr.font_descent()?;
                cached = Some((para.props.clone(), height));
            }
            para.line_height = cached.as_ref().map_or(0, |(_, height)| *height);
            para.lines = None;
        }
        log::debug!("laid out {} paragraphs at width {}", self.paragraphs.len(), width);
        Ok(())
    }

    fn height(&self) -> i32 {
        self.paragraphs.iter().map(Paragraph::height).sum()
    }

    fn width(&self) -> i32 {
        self.width
    }

    fn prepare_to_draw(&mut self, gr: &mut dyn Graphics, coords: &CoordRects, clip: Rect) -> ViewResult<PrepareOutcome> {
        let mut expansions = Vec::new();
        let mut top = 0;
        for para in &mut self.paragraphs {
            let height = para.height();
            let visible = coords.to_dst_y(top + height) > clip.top && coords.to_dst_y(top) < clip.bottom;
            if para.lines.is_none() && visible {
                gr.setup_graphics(&para.props)?;
                para.lines = Some(wrap(gr, &para.text, coords.scale_to_dst_x(self.width))?);
                let delta = para.height() - height;
                if delta != 0 {
                    expansions.push(LazyExpansion { position: top, delta });
                }
            }
            top += para.height();
        }
        Ok(PrepareOutcome::expanded(expansions))
    }

    fn draw_root(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        clip: Rect,
        draw_selection: bool,
    ) -> ViewResult<()> {
        let selection = self
            .selection
            .filter(|_| draw_selection && self.state != SelectionState::Disabled);
        let mut top = 0;
        for (index, para) in self.paragraphs.iter().enumerate() {
            let height = para.height();
            let visible = coords.to_dst_y(top + height) > clip.top && coords.to_dst_y(top) < clip.bottom;
            if let (true, Some(lines)) = (visible, &para.lines) {
                gr.setup_graphics(&para.props)?;
                for (i, line) in lines.iter().enumerate() {
                    let y = top + i as i32 * para.line_height;
                    let line_top = coords.to_dst_y(y);
                    if coords.to_dst_y(y + para.line_height) <= clip.top || line_top >= clip.bottom {
                        continue;
                    }
                    let text = para.line_text(*line);
                    if let Some(selection) = selection {
                        self.draw_line_selection(gr, coords, index, *line, &text, y, selection)?;
                        gr.set_back_color(para.props.back_color);
                    }
                    gr.draw_text(coords.to_dst_x(0), line_top, &text, 0)?;
                }
            }
            top += height;
        }
        Ok(())
    }

    fn make_selection_at(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        point: Point,
    ) -> ViewResult<Option<Selection>> {
        let layout = coords.to_src_point(point);
        let Some((index, line_index)) = self.hit_line(layout.y) else {
            return Ok(None);
        };
        let para = &self.paragraphs[index];
        let Some(line) = para.lines.as_ref().map(|lines| lines[line_index]) else {
            return Ok(None);
        };
        gr.setup_graphics(&para.props)?;
        let offset = line.start + char_at(gr, &para.line_text(line), layout.x)?;
        let selection = Selection::caret(TextPos::new(index, offset.min(line.end)));
        self.selection = Some(selection);
        Ok(Some(selection))
    }

    fn selection(&self) -> Option<Selection> {
        self.selection
    }

    fn make_text_selection(&mut self, selection: Selection) -> ViewResult<()> {
        let anchor = self.clamp_pos(selection.anchor);
        let end = self.clamp_pos(selection.end);
        self.selection = Some(Selection::range(anchor, end));
        Ok(())
    }

    fn set_selection_properties(&mut self, changes: &TextPropChanges) -> ViewResult<()> {
        let Some(selection) = self.selection else {
            return Ok(());
        };
        for para in &mut self.paragraphs[selection.start().para..=selection.limit().para] {
            changes.apply_to(&mut para.props);
            para.lines = None;
        }
        Ok(())
    }

    fn selection_location(
        &mut self,
        gr: &mut dyn Graphics,
        coords: &CoordRects,
        selection: &Selection,
    ) -> ViewResult<SelectionLocation> {
        let primary = coords.to_dst_rect(&self.caret_rect(gr, selection.end)?);
        let secondary = if selection.is_range() {
            Some(coords.to_dst_rect(&self.caret_rect(gr, selection.anchor)?))
        } else {
            None
        };
        Ok(SelectionLocation {
            primary,
            secondary,
            end_before_anchor: selection.end_before_anchor(),
            is_range: selection.is_range(),
        })
    }

    fn activate(&mut self, state: SelectionState) {
        self.state = state;
    }

    fn convert_offscreen_to_lazy(&mut self, approve: &mut dyn FnMut(i32, i32) -> bool) -> Vec<LazyExpansion> {
        let mut collapsed = Vec::new();
        let mut top = 0;
        for para in &mut self.paragraphs {
            let height = para.height();
            if para.lines.is_some() && approve(top, top + height) {
                para.lines = None;
                let delta = para.height() - height;
                if delta != 0 {
                    collapsed.push(LazyExpansion { position: top, delta });
                }
            }
            top += para.height();
        }
        collapsed
    }
}
