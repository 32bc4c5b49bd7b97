//! Error types for vw-view.

use thiserror::Error;
use vw_graphics::GraphicsError;

/// Result type alias using ViewError.
pub type ViewResult<T> = Result<T, ViewError>;

/// Errors raised by the view coordinator and its layout boxes.
#[derive(Debug, Error)]
pub enum ViewError {
    /// Drawing or measurement failed in the graphics engine.
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// The layout box could not lay out, draw or locate content.
    #[error("Layout error: {0}")]
    Layout(String),

    /// The shared layout box is already borrowed (re-entrant call).
    #[error("Layout box is already in use")]
    RootBoxBusy,

    /// Two panes of a split view must share one layout box.
    #[error("Split panes do not share a layout box")]
    UnsharedRootBox,

    /// A pane index outside the split view.
    #[error("No pane at index {0}")]
    NoSuchPane(usize),

    /// Invalid view configuration.
    #[error("Invalid view configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Config(err.to_string())
    }
}
