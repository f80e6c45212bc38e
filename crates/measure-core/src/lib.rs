//! measure-core: method channel plumbing + display density service.
//!
//! Design goal: keep this crate platform-agnostic so the whole request path
//! is testable without a host. Real display queries live in `measure-platform`.
//!
//! A call travels: `MethodChannel::invoke_method` -> JSON codec -> `Messenger`
//! -> `MethodCallHandler` (the `DensityQueryService`) -> JSON reply.

pub mod codec;
mod config;
mod messenger;
mod method;
mod metrics;
mod plugin;
mod service;

pub use codec::{CodecError, CodecResult};
pub use config::{config_file_path, get_config_dir, ConfigError, ConfigResult, MeasureConfig};
pub use messenger::{
    ChannelError, ChannelResult, MessageHandler, Messenger, MethodChannel, PlatformRunner,
    PlatformRunnerHandle,
};
pub use method::{Method, MethodCall, MethodResult};
pub use metrics::{
    is_valid_ppi, ppi_from_extent, DisplayMetricsProvider, FixedDisplayMetrics, DEFAULT_FALLBACK_PPI,
};
pub use plugin::{MeasurePlugin, Plugin, PluginRegistry};
pub use service::{DensityQueryService, MethodCallHandler};

/// Name of the channel the measure plugin serves on.
pub const CHANNEL_NAME: &str = "measure";
