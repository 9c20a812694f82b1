//! Theme and Colors
//!
//! Chrome colors for the panels around the canvas. The canvas itself
//! takes its colors straight from the engine raster; nothing here may
//! leak into the grid pixels.

use neuroflow_core::Rgb;
use ratatui::style::Color;

// ============================================================================
// Panel Chrome
// ============================================================================

/// Headers and the selected experiment
pub const ACCENT: Color = Color::Rgb(76, 201, 240);

/// Secondary accent (paint/output features)
pub const ACCENT_WARM: Color = Color::Rgb(247, 37, 133);

/// Regular sidebar text
pub const TEXT: Color = Color::Rgb(200, 200, 200);

/// De-emphasized text and separators
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Error line in the status bar
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Running indicator
pub const RUNNING_GREEN: Color = Color::Rgb(120, 230, 120);

/// Paused/initializing indicator
pub const BUSY_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Convert an engine raster pixel to a terminal color.
pub fn pixel_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
