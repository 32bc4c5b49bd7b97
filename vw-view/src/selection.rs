//! Selections and where they render.

use vw_graphics::{BackColor, CharRenderProps, Rect, Rgb};

/// A position between characters: paragraph index and character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextPos {
    pub para: usize,
    pub offset: usize,
}

impl TextPos {
    pub const fn new(para: usize, offset: usize) -> Self {
        Self { para, offset }
    }
}

/// A caret (`anchor == end`) or a range from `anchor` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: TextPos,
    pub end: TextPos,
}

impl Selection {
    pub fn caret(at: TextPos) -> Self {
        Self { anchor: at, end: at }
    }

    pub fn range(anchor: TextPos, end: TextPos) -> Self {
        Self { anchor, end }
    }

    pub fn is_range(&self) -> bool {
        self.anchor != self.end
    }

    /// Whether the selection was extended backward.
    pub fn end_before_anchor(&self) -> bool {
        self.end < self.anchor
    }

    /// The earlier of the two ends.
    pub fn start(&self) -> TextPos {
        self.anchor.min(self.end)
    }

    /// The later of the two ends.
    pub fn limit(&self) -> TextPos {
        self.anchor.max(self.end)
    }
}

/// Where a selection renders, in layout-frame device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLocation {
    pub primary: Rect,
    /// A second rectangle, e.g. the other half of a split caret.
    pub secondary: Option<Rect>,
    pub end_before_anchor: bool,
    pub is_range: bool,
}

/// How a layout box should render its selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Not drawn.
    Disabled,
    /// Drawn, but as an inactive (unfocused) selection.
    OutOfFocus,
    /// Drawn as the active selection.
    Enabled,
}

/// Text property changes applied to a selection; `None` leaves a property as is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextPropChanges {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub size_mp: Option<i32>,
    pub face_name: Option<String>,
    pub fore_color: Option<Rgb>,
    pub back_color: Option<BackColor>,
}

impl TextPropChanges {
    pub fn is_empty(&self) -> bool {
        *self == TextPropChanges::default()
    }

    pub fn apply_to(&self, props: &mut CharRenderProps) {
        if let Some(bold) = self.bold {
            props.bold = bold;
        }
        if let Some(italic) = self.italic {
            props.italic = italic;
        }
        if let Some(size) = self.size_mp {
            props.size_mp = size;
        }
        if let Some(face) = &self.face_name {
            props.face_name = face.clone();
        }
        if let Some(color) = self.fore_color {
            props.fore_color = color;
        }
        if let Some(color) = self.back_color {
            props.back_color = color;
        }
    }
}
