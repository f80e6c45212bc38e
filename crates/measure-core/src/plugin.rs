//! Plugin lifecycle: attach to and detach from a host messenger.

use crate::messenger::{Messenger, MethodChannel};
use crate::metrics::DisplayMetricsProvider;
use crate::service::{DensityQueryService, MethodCallHandler};
use crate::CHANNEL_NAME;
use std::sync::Arc;
use tracing::{debug, info};

/// A unit the host starts and stops.
pub trait Plugin: Send {
    fn name(&self) -> &str;
    /// Attach to the host messenger.
    fn start(&mut self, messenger: &Messenger);
    /// Detach from the host messenger.
    fn stop(&mut self, messenger: &Messenger);
}

/// Serves the density query service on a method channel.
pub struct MeasurePlugin {
    channel_name: String,
    handler: Arc<dyn MethodCallHandler>,
    channel: Option<MethodChannel>,
}

impl MeasurePlugin {
    pub fn new<P: DisplayMetricsProvider + 'static>(provider: P) -> Self {
        Self::with_service(DensityQueryService::new(provider))
    }

    pub fn with_service<P: DisplayMetricsProvider + 'static>(service: DensityQueryService<P>) -> Self {
        Self { channel_name: CHANNEL_NAME.to_string(), handler: Arc::new(service), channel: None }
    }

    /// Serve on a different channel name.
    pub fn on_channel(mut self, name: impl Into<String>) -> Self {
        self.channel_name = name.into();
        self
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn is_attached(&self) -> bool {
        self.channel.is_some()
    }
}

impl Plugin for MeasurePlugin {
    fn name(&self) -> &str {
        &self.channel_name
    }

    fn start(&mut self, messenger: &Messenger) {
        if self.channel.is_some() {
            debug!(channel = %self.channel_name, "Plugin already attached");
            return;
        }
        let channel = MethodChannel::new(messenger, self.channel_name.clone());
        channel.set_method_call_handler(Some(self.handler.clone()));
        info!(channel = %self.channel_name, "Measure plugin attached");
        self.channel = Some(channel);
    }

    fn stop(&mut self, _messenger: &Messenger) {
        match self.channel.take() {
            Some(channel) => {
                channel.set_method_call_handler(None);
                info!(channel = %self.channel_name, "Measure plugin detached");
            }
            None => debug!(channel = %self.channel_name, "Plugin not attached"),
        }
    }
}

/// Owns plugins and drives their lifecycle against one messenger.
pub struct PluginRegistry {
    messenger: Messenger,
    plugins: Vec<Box<dyn Plugin>>,
    started: bool,
}

impl PluginRegistry {
    pub fn new(messenger: Messenger) -> Self {
        Self { messenger, plugins: Vec::new(), started: false }
    }

    /// Add a plugin. If the registry is running, the plugin starts at once.
    pub fn add(&mut self, mut plugin: Box<dyn Plugin>) {
        if self.started {
            plugin.start(&self.messenger);
        }
        debug!(plugin = plugin.name(), "Plugin registered");
        self.plugins.push(plugin);
    }

    /// Start all plugins in registration order.
    pub fn start_all(&mut self) {
        if self.started {
            return;
        }
        for plugin in &mut self.plugins {
            plugin.start(&self.messenger);
        }
        self.started = true;
    }

    /// Stop all plugins in reverse registration order.
    pub fn stop_all(&mut self) {
        if !self.started {
            return;
        }
        for plugin in self.plugins.iter_mut().rev() {
            plugin.stop(&self.messenger);
        }
        self.started = false;
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
