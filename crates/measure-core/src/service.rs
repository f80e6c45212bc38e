//! Density query service: dispatches method calls to the metrics provider.

use crate::metrics::{is_valid_ppi, DisplayMetricsProvider, DEFAULT_FALLBACK_PPI};
use crate::{Method, MethodCall, MethodResult};
use tracing::{debug, warn};

/// Handles method calls arriving on a channel.
pub trait MethodCallHandler: Send + Sync {
    fn on_method_call(&self, call: &MethodCall) -> MethodResult;
}

/// Stateless service answering `getPhysicalPixelsPerInch`.
pub struct DensityQueryService<P: DisplayMetricsProvider> {
    provider: P,
    fallback_ppi: f64,
}

impl<P: DisplayMetricsProvider> DensityQueryService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider, fallback_ppi: DEFAULT_FALLBACK_PPI }
    }

    /// Use `fallback_ppi` when the provider reports nothing usable.
    /// Invalid fallbacks are ignored.
    pub fn with_fallback(mut self, fallback_ppi: f64) -> Self {
        if is_valid_ppi(fallback_ppi) {
            self.fallback_ppi = fallback_ppi;
        } else {
            warn!(fallback_ppi, "Ignoring invalid fallback density");
        }
        self
    }

    pub fn fallback_ppi(&self) -> f64 {
        self.fallback_ppi
    }

    /// Current horizontal physical density. Always positive and finite.
    pub fn physical_pixels_per_inch(&self) -> f64 {
        match self.provider.physical_pixels_per_inch() {
            Some(ppi) if is_valid_ppi(ppi) => ppi,
            Some(ppi) => {
                warn!(ppi, fallback = self.fallback_ppi, "Display reported invalid density, using fallback");
                self.fallback_ppi
            }
            None => {
                warn!(fallback = self.fallback_ppi, "Display density unavailable, using fallback");
                self.fallback_ppi
            }
        }
    }

    /// Dispatch a single call.
    pub fn handle(&self, call: &MethodCall) -> MethodResult {
        let Some(method) = call.resolve() else {
            debug!(method = %call.method, "Method not implemented");
            return MethodResult::NotImplemented;
        };

        match method {
            Method::GetPhysicalPixelsPerInch => {
                let ppi = self.physical_pixels_per_inch();
                debug!(%method, ppi, "Answered method call");
                MethodResult::success(ppi)
            }
        }
    }
}

impl<P: DisplayMetricsProvider> MethodCallHandler for DensityQueryService<P> {
    fn on_method_call(&self, call: &MethodCall) -> MethodResult {
        self.handle(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FixedDisplayMetrics;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingMetrics {
        ppi: Option<f64>,
        calls: AtomicUsize,
    }

    impl DisplayMetricsProvider for CountingMetrics {
        fn physical_pixels_per_inch(&self) -> Option<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.ppi
        }
    }

    #[test]
    fn test_recognized_method_returns_density() {
        let service = DensityQueryService::new(FixedDisplayMetrics(160.0));
        let result = service.handle(&MethodCall::new("getPhysicalPixelsPerInch"));
        assert_eq!(result, MethodResult::success(160.0));
    }

    #[test]
    fn test_unknown_method_not_implemented() {
        let service = DensityQueryService::new(FixedDisplayMetrics(160.0));
        assert!(service.handle(&MethodCall::new("someOtherMethod")).is_not_implemented());
        assert!(service.handle(&MethodCall::new("")).is_not_implemented());
    }

    #[test]
    fn test_repeated_calls_are_consistent() {
        let service = DensityQueryService::new(FixedDisplayMetrics(326.0));
        let call = MethodCall::new("getPhysicalPixelsPerInch");
        let first = service.handle(&call);
        let second = service.handle(&call);
        assert_eq!(first, second);
        assert_eq!(first.as_f64(), Some(326.0));
    }

    #[test]
    fn test_metrics_queried_per_call() {
        let service = DensityQueryService::new(CountingMetrics { ppi: Some(401.0), calls: AtomicUsize::new(0) });
        let call = MethodCall::new("getPhysicalPixelsPerInch");
        service.handle(&call);
        service.handle(&call);
        service.handle(&MethodCall::new("nope"));
        assert_eq!(service.provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalid_density_uses_fallback() {
        let service = DensityQueryService::new(FixedDisplayMetrics(0.0)).with_fallback(110.0);
        assert_eq!(service.physical_pixels_per_inch(), 110.0);

        let service = DensityQueryService::new(FixedDisplayMetrics(f64::NAN));
        assert_eq!(service.physical_pixels_per_inch(), DEFAULT_FALLBACK_PPI);

        let service = DensityQueryService::new(CountingMetrics { ppi: None, calls: AtomicUsize::new(0) });
        let value = service.handle(&MethodCall::new("getPhysicalPixelsPerInch")).as_f64().unwrap();
        assert!(value.is_finite() && value > 0.0);
    }

    #[test]
    fn test_invalid_fallback_ignored() {
        let service = DensityQueryService::new(FixedDisplayMetrics(200.0)).with_fallback(-1.0);
        assert_eq!(service.fallback_ppi(), DEFAULT_FALLBACK_PPI);
    }

    #[test]
    fn test_arguments_are_ignored() {
        let service = DensityQueryService::new(FixedDisplayMetrics(160.0));
        let call = MethodCall::with_args("getPhysicalPixelsPerInch", serde_json::json!({"display": 2}));
        assert_eq!(service.handle(&call).as_f64(), Some(160.0));
    }
}
