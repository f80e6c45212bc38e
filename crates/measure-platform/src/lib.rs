//! measure-platform: platform-specific display density queries.
//!
//! This crate provides:
//! - Physical pixels-per-inch of the primary display, per OS
//! - `SystemDisplayMetrics`, the `DisplayMetricsProvider` backed by the OS
//! - DPI awareness setup for Windows
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `dpi` - Density queries with platform-specific implementations

mod dpi;
mod error;

pub use dpi::{physical_pixels_per_inch, set_dpi_aware, SystemDisplayMetrics};
pub use error::{PlatformError, PlatformResult};
