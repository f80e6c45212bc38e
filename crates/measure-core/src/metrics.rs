//! Display metrics port.
//!
//! The density service only sees this trait; real platform queries live in
//! `measure-platform`.

/// Baseline density used when the platform cannot report one.
pub const DEFAULT_FALLBACK_PPI: f64 = 96.0;

const MM_PER_INCH: f64 = 25.4;

/// Source of physical display density, queried on every call.
pub trait DisplayMetricsProvider: Send + Sync {
    /// Horizontal physical pixels per inch of the primary display,
    /// or `None` when the platform cannot tell.
    fn physical_pixels_per_inch(&self) -> Option<f64>;
}

impl<T: DisplayMetricsProvider + ?Sized> DisplayMetricsProvider for std::sync::Arc<T> {
    fn physical_pixels_per_inch(&self) -> Option<f64> {
        (**self).physical_pixels_per_inch()
    }
}

/// Simulated host metrics with a constant density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDisplayMetrics(pub f64);

impl DisplayMetricsProvider for FixedDisplayMetrics {
    fn physical_pixels_per_inch(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// Whether a reported density can be handed to callers.
pub fn is_valid_ppi(ppi: f64) -> bool {
    ppi.is_finite() && ppi > 0.0
}

/// Pixels per inch for `pixels` spread over `millimetres`.
pub fn ppi_from_extent(pixels: u32, millimetres: f64) -> Option<f64> {
    if pixels == 0 || !(millimetres.is_finite() && millimetres > 0.0) {
        return None;
    }
    let ppi = f64::from(pixels) / (millimetres / MM_PER_INCH);
    is_valid_ppi(ppi).then_some(ppi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ppi_from_extent() {
        // 1920 px across 508 mm (20 in) is 96 ppi.
        let ppi = ppi_from_extent(1920, 508.0).unwrap();
        assert!((ppi - 96.0).abs() < 1e-9);

        // 2560 px across 286 mm (13.3" laptop panel)
        let ppi = ppi_from_extent(2560, 286.0).unwrap();
        assert!((ppi - 227.35).abs() < 0.01);
    }

    #[test]
    fn test_ppi_from_extent_rejects_empty() {
        assert_eq!(ppi_from_extent(0, 300.0), None);
        assert_eq!(ppi_from_extent(1920, 0.0), None);
        assert_eq!(ppi_from_extent(1920, -1.0), None);
        assert_eq!(ppi_from_extent(1920, f64::NAN), None);
    }

    #[test]
    fn test_is_valid_ppi() {
        assert!(is_valid_ppi(160.0));
        assert!(!is_valid_ppi(0.0));
        assert!(!is_valid_ppi(-3.0));
        assert!(!is_valid_ppi(f64::INFINITY));
        assert!(!is_valid_ppi(f64::NAN));
    }

    #[test]
    fn test_fixed_metrics() {
        assert_eq!(FixedDisplayMetrics(326.0).physical_pixels_per_inch(), Some(326.0));
    }
}
