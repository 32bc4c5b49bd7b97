//! Error types for vw-graphics.

use thiserror::Error;

/// Result type alias using GraphicsError.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

/// Errors that can occur in drawing and measurement operations.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// The engine has no device bound (call `initialize` first).
    #[error("Graphics engine is not bound to a device")]
    NotInitialized,

    /// `initialize` was called while a device is still bound.
    #[error("Graphics engine is already bound to a device; release it first")]
    AlreadyInitialized,

    /// The measuring device cannot answer metric queries.
    #[error("Surface cannot answer measurement queries: {0}")]
    MeasurementUnsupported(&'static str),

    /// No font has been selected with `setup_graphics`.
    #[error("No font selected")]
    NoFontSelected,

    /// The back-end failed to create a font.
    #[error("Failed to create font '{face}': {reason}")]
    FontCreation { face: String, reason: String },

    /// Failed to parse a font file.
    #[error("Failed to parse font data: {0}")]
    FontParseError(String),

    /// The requested glyph does not exist in the selected font.
    #[error("Glyph {0} is not present in the selected font")]
    GlyphNotFound(u16),

    /// The glyph outline could not be retrieved.
    #[error("Failed to retrieve outline for glyph {0}")]
    GlyphOutline(u16),

    /// The requested font table is not present in the font.
    #[error("Font table '{}' not found", tag_name(.0))]
    FontTableNotFound([u8; 4]),

    /// The caller's buffer is too small to hold the font table.
    #[error("Buffer too small for font table: {required} bytes required")]
    FontTableBufferTooSmall { required: usize },

    /// An argument was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to parse a color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// Invalid surface dimensions.
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Text drawing or measurement failed in the back-end.
    #[error("Text error: {0}")]
    TextError(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngError(String),

    /// Display list serialization error.
    #[error("Display list serialization error: {0}")]
    SerializationError(String),
}

fn tag_name(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

impl From<png::EncodingError> for GraphicsError {
    fn from(err: png::EncodingError) -> Self {
        GraphicsError::PngError(err.to_string())
    }
}

impl From<serde_json::Error> for GraphicsError {
    fn from(err: serde_json::Error) -> Self {
        GraphicsError::SerializationError(err.to_string())
    }
}
