//! Device-independent drawing and text measurement.
//!
//! [`VwGraphics`] drives a pluggable [`DrawingSurface`] and exposes the
//! [`Graphics`] capability that layout code draws and measures through. It
//! keeps separate draw and measure devices, caches the selected font, maintains
//! a clip stack, and restores every device it was bound to on release.
//!
//! Two surfaces are provided:
//! - [`RasterSurface`] renders into a `tiny-skia` pixmap, with fonts resolved by
//!   `fontdb` and read with `ttf-parser`
//! - [`RecordingSurface`] captures a serializable display list and can measure
//!   with a deterministic fixed-pitch model
//!
//! # Example
//!
//! ```rust,ignore
//! use vw_graphics::{CharRenderProps, FixedMetrics, RecordingSurface, VwGraphics};
//!
//! let mut gr = VwGraphics::with_surface(RecordingSurface::with_metrics(96, FixedMetrics::default()));
//! gr.setup_graphics(&CharRenderProps::default())?;
//! let size = gr.measure_text("Hello")?;
//! gr.draw_text(10, 10, "Hello", 0)?;
//! let surface = gr.release_device();
//! ```

mod dash;
mod drawing_state;
mod error;
mod font_config;
mod geometry;
mod graphics;
mod raster;
mod recording;
mod style;
mod surface;
mod text;

pub use drawing_state::DrawingState;
pub use error::{GraphicsError, GraphicsResult};
pub use font_config::{FontConfig, GenericFamilies, ResolvedFontConfig};
pub use geometry::{mul_div, CoordRects, Point, Rect, Size};
pub use graphics::{GlyphRunOptions, Graphics, VwGraphics};
pub use raster::RasterSurface;
pub use recording::{DrawCommand, FixedMetrics, RecordingSurface};
pub use style::{BackColor, CharRenderProps, FontSpec, Pen, Rgb};
pub use surface::{DrawingSurface, FontId, FontMetrics, GlyphMetrics, GlyphRun, SavedState, TextRun};
