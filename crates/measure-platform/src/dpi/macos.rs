//! macOS display density via Core Graphics.
//!
//! The main display's native pixel width is divided by the physical width
//! reported by `CGDisplayScreenSize`. Retina scaling does not affect the
//! result because the display mode's pixel width is used, not its point width.

use crate::error::{PlatformError, PlatformResult};
use core_graphics::display::CGDisplay;
use measure_core::ppi_from_extent;
use tracing::debug;

/// Set DPI awareness (no-op on macOS).
pub fn set_dpi_aware() {
    // No-op: macOS handles this automatically
}

/// Horizontal physical density of the main display.
pub fn physical_pixels_per_inch() -> PlatformResult<f64> {
    let display = CGDisplay::main();
    if !display.is_active() {
        return Err(PlatformError::NoDisplay);
    }

    let pixels = display
        .display_mode()
        .map(|mode| mode.pixel_width())
        .unwrap_or_else(|| display.pixels_wide());
    let pixels = u32::try_from(pixels).map_err(|_| PlatformError::QueryFailed(format!("pixel width {}", pixels)))?;

    let millimetres = display.screen_size().width;
    let ppi = ppi_from_extent(pixels, millimetres).ok_or(PlatformError::UnknownPhysicalSize)?;
    debug!(pixels, millimetres, ppi, "Density from main display");
    Ok(ppi)
}
