//! Physical display density for the primary display.
//!
//! Platform implementations:
//! - Windows: GDI device caps (`windows.rs`)
//! - macOS: Core Graphics main display (`macos.rs`)
//! - Linux: DRM connector EDID from sysfs (`linux.rs`)

use crate::error::PlatformResult;
use measure_core::DisplayMetricsProvider;
use tracing::debug;

#[cfg(windows)]
mod windows;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(windows)]
pub use windows::{physical_pixels_per_inch, set_dpi_aware};

#[cfg(target_os = "macos")]
pub use macos::{physical_pixels_per_inch, set_dpi_aware};

#[cfg(target_os = "linux")]
pub use linux::{physical_pixels_per_inch, set_dpi_aware};

#[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
mod fallback {
    use crate::error::{PlatformError, PlatformResult};

    /// Set DPI awareness (no-op on unsupported platforms).
    pub fn set_dpi_aware() {}

    pub fn physical_pixels_per_inch() -> PlatformResult<f64> {
        Err(PlatformError::NotSupported)
    }
}

#[cfg(not(any(windows, target_os = "macos", target_os = "linux")))]
pub use fallback::{physical_pixels_per_inch, set_dpi_aware};

/// Display metrics read from the operating system on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDisplayMetrics;

impl SystemDisplayMetrics {
    pub fn new() -> Self {
        Self
    }

    /// Query the OS, keeping the platform error.
    pub fn query(&self) -> PlatformResult<f64> {
        physical_pixels_per_inch()
    }
}

impl DisplayMetricsProvider for SystemDisplayMetrics {
    fn physical_pixels_per_inch(&self) -> Option<f64> {
        match self.query() {
            Ok(ppi) => Some(ppi),
            Err(error) => {
                debug!(%error, "Display density query failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use measure_core::{DensityQueryService, MethodCall};

    #[test]
    fn test_system_metrics_never_fail_the_service() {
        // Headless CI machines have no display; the service must still answer.
        let service = DensityQueryService::new(SystemDisplayMetrics::new());
        let value = service.handle(&MethodCall::new("getPhysicalPixelsPerInch")).as_f64().unwrap();
        assert!(value.is_finite() && value > 0.0);
    }

    #[test]
    fn test_query_is_positive_when_available() {
        if let Ok(ppi) = SystemDisplayMetrics::new().query() {
            assert!(ppi.is_finite() && ppi > 0.0);
        }
    }

    #[test]
    fn test_set_dpi_aware_is_idempotent() {
        set_dpi_aware();
        set_dpi_aware();
    }
}
