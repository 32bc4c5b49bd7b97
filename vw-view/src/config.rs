//! View configuration.

use crate::error::{ViewError, ViewResult};
use serde::Deserialize;
use vw_graphics::Rgb;

/// Layout, scrolling and reporting parameters for a root site.
///
/// Every field has a default, so a JSON document only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Gap between the client edge and content on the left and right, in device units.
    pub horizontal_margin: i32,
    /// Gap above the content, in device units.
    pub top_margin: i32,
    /// Extra device units below the content beyond the descender allowance
    /// of one eighth of an inch.
    pub scroll_padding: i32,
    /// Narrower available widths leave the view "not ready" instead of laid out.
    pub min_layout_width: i32,
    /// Trial passes allowed before scroll-into-view settles for its last candidate.
    pub max_convergence_passes: usize,
    /// Distinct error messages remembered to suppress repeats.
    pub error_history: usize,
    /// Destination scale relative to the device resolution.
    pub zoom: f32,
    /// Color painted behind the content before each draw.
    pub background: Rgb,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            horizontal_margin: 2,
            top_margin: 0,
            scroll_padding: 2,
            min_layout_width: 20,
            max_convergence_passes: 4,
            error_history: 16,
            zoom: 1.0,
            background: Rgb::WHITE,
        }
    }
}

impl ViewConfig {
    /// Parse a configuration from JSON, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> ViewResult<Self> {
        let config: ViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ViewResult<()> {
        if self.max_convergence_passes == 0 {
            return Err(ViewError::Config(
                "max_convergence_passes must be at least 1".to_string(),
            ));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(ViewError::Config(format!("zoom must be positive, got {}", self.zoom)));
        }
        if self.horizontal_margin < 0 || self.top_margin < 0 {
            return Err(ViewError::Config("margins must not be negative".to_string()));
        }
        Ok(())
    }
}
