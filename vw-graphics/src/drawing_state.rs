//! Engine state that outlives individual drawing calls.

use crate::error::GraphicsResult;
use crate::geometry::Rect;
use crate::style::{BackColor, FontSpec, Rgb};
use crate::surface::{DrawingSurface, FontId, SavedState};

/// Colors, cached font selection and clip override.
#[derive(Debug, Clone, Default)]
pub struct DrawingState {
    /// Current foreground (text and line) color.
    pub fore_color: Rgb,
    /// Current background (rectangle fill and text cell) color.
    pub back_color: BackColor,
    /// Font-selection subset of the properties last passed to `setup_graphics`.
    pub font_spec: Option<FontSpec>,
    /// Explicit clip rectangle for devices whose native clip cannot be read.
    pub clip_override: Option<Rect>,
}

/// One entry of a device's unwind log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeviceUndo {
    /// Device state saved when the device was bound.
    State(SavedState),
    /// The font that was selected before the engine first selected its own.
    Font { original: Option<FontId> },
}

/// A surface bound to the engine, with everything needed to hand it back
/// in the state it arrived in.
pub(crate) struct BoundDevice<D: DrawingSurface> {
    pub(crate) surface: D,
    undo: Vec<DeviceUndo>,
    /// Font created by the engine and currently selected.
    font: Option<FontId>,
}

impl<D: DrawingSurface> BoundDevice<D> {
    pub(crate) fn bind(mut surface: D) -> Self {
        let token = surface.save_state();
        Self {
            surface,
            undo: vec![DeviceUndo::State(token)],
            font: None,
        }
    }

    /// Create and select a font for `spec`, deleting the one it supersedes.
    pub(crate) fn install_font(&mut self, spec: &FontSpec) -> GraphicsResult<()> {
        let font = self.surface.create_font(spec)?;
        let previous = self.surface.select_font(Some(font));
        match self.font.replace(font) {
            Some(superseded) => self.surface.delete_font(superseded),
            None => self.undo.push(DeviceUndo::Font { original: previous }),
        }
        Ok(())
    }

    /// Undo every substitution in reverse order and return the surface.
    pub(crate) fn unwind(mut self) -> D {
        while let Some(entry) = self.undo.pop() {
            match entry {
                DeviceUndo::Font { original } => {
                    self.surface.select_font(original);
                    if let Some(font) = self.font.take() {
                        self.surface.delete_font(font);
                    }
                }
                DeviceUndo::State(token) => self.surface.restore_state(token),
            }
        }
        self.surface
    }
}
