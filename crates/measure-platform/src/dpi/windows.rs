//! Windows display density via GDI device caps.

use crate::error::{PlatformError, PlatformResult};
use measure_core::{is_valid_ppi, ppi_from_extent};
use std::ptr;
use std::sync::Once;
use tracing::{debug, info, warn};
use windows_sys::Win32::Graphics::Gdi::{GetDC, GetDeviceCaps, ReleaseDC, HORZRES, HORZSIZE};

static INIT: Once = Once::new();

/// Set the process DPI awareness to Per-Monitor V2.
/// Without it GDI reports virtualized (96 dpi scaled) resolutions.
///
/// Must be called early in the application lifecycle, before any window is created.
pub fn set_dpi_aware() {
    INIT.call_once(|| {
        // Try to set Per-Monitor V2 DPI awareness (Windows 10 1703+)
        unsafe {
            const DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2: isize = -4;

            #[link(name = "user32")]
            extern "system" {
                fn SetProcessDpiAwarenessContext(value: isize) -> i32;
            }

            let result = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
            if result != 0 {
                info!("Set Per-Monitor V2 DPI awareness");
            } else {
                warn!("Failed to set Per-Monitor V2 DPI awareness, resolution may be virtualized");
            }
        }
    });
}

/// Horizontal physical density of the primary display.
///
/// Uses the screen DC's pixel width over its reported width in millimetres,
/// falling back to the system DPI when the driver reports no physical size.
pub fn physical_pixels_per_inch() -> PlatformResult<f64> {
    let (pixels, millimetres) = screen_extent()?;
    if let Some(ppi) = u32::try_from(pixels).ok().and_then(|px| ppi_from_extent(px, f64::from(millimetres))) {
        debug!(pixels, millimetres, ppi, "Density from device caps");
        return Ok(ppi);
    }

    let dpi = system_dpi();
    debug!(dpi, "Device caps lack physical size, using system DPI");
    if is_valid_ppi(dpi) {
        Ok(dpi)
    } else {
        Err(PlatformError::UnknownPhysicalSize)
    }
}

fn screen_extent() -> PlatformResult<(i32, i32)> {
    unsafe {
        let hdc = GetDC(ptr::null_mut()); // null = entire screen
        if hdc.is_null() {
            return Err(PlatformError::QueryFailed("GetDC returned null".into()));
        }

        let pixels = GetDeviceCaps(hdc, HORZRES);
        let millimetres = GetDeviceCaps(hdc, HORZSIZE);

        ReleaseDC(ptr::null_mut(), hdc);
        Ok((pixels, millimetres))
    }
}

fn system_dpi() -> f64 {
    unsafe {
        #[link(name = "user32")]
        extern "system" {
            fn GetDpiForSystem() -> u32;
        }

        f64::from(GetDpiForSystem())
    }
}
