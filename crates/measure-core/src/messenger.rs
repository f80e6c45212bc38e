//! In-process messenger, method channels and the platform runner thread.

use crate::codec::{self, CodecError};
use crate::service::MethodCallHandler;
use crate::{MethodCall, MethodResult};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("platform runner is not running")]
    RunnerStopped,
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Receives raw messages for a channel and produces the raw reply.
pub trait MessageHandler: Send + Sync {
    fn on_message(&self, message: &[u8]) -> Vec<u8>;
}

/// Registry of channel handlers, keyed by channel name.
#[derive(Clone, Default)]
pub struct Messenger {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn MessageHandler>>>>,
}

impl Messenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (`Some`) or remove (`None`) the handler of a channel.
    pub fn set_message_handler(&self, channel: &str, handler: Option<Arc<dyn MessageHandler>>) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        match handler {
            Some(handler) => {
                if handlers.insert(channel.to_string(), handler).is_some() {
                    debug!(channel, "Replaced channel handler");
                } else {
                    debug!(channel, "Registered channel handler");
                }
            }
            None => {
                if handlers.remove(channel).is_some() {
                    debug!(channel, "Removed channel handler");
                }
            }
        }
    }

    pub fn has_handler(&self, channel: &str) -> bool {
        self.handlers.read().unwrap_or_else(|e| e.into_inner()).contains_key(channel)
    }

    /// Deliver a message. Channels without a handler get an empty reply.
    pub fn send(&self, channel: &str, message: &[u8]) -> Vec<u8> {
        let handler = self.handlers.read().unwrap_or_else(|e| e.into_inner()).get(channel).cloned();
        match handler {
            Some(handler) => handler.on_message(message),
            None => {
                debug!(channel, "No handler registered, replying empty");
                Vec::new()
            }
        }
    }
}

/// A named channel speaking the JSON method codec.
#[derive(Clone)]
pub struct MethodChannel {
    name: String,
    messenger: Messenger,
}

impl MethodChannel {
    pub fn new(messenger: &Messenger, name: impl Into<String>) -> Self {
        Self { name: name.into(), messenger: messenger.clone() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install (`Some`) or clear (`None`) the handler serving this channel.
    pub fn set_method_call_handler(&self, handler: Option<Arc<dyn MethodCallHandler>>) {
        let adapter = handler.map(|handler| {
            Arc::new(MethodCallAdapter { channel: self.name.clone(), handler }) as Arc<dyn MessageHandler>
        });
        self.messenger.set_message_handler(&self.name, adapter);
    }

    /// Call a method on this channel and decode the reply.
    pub fn invoke_method(&self, method: &str, args: Value) -> ChannelResult<MethodResult> {
        let message = codec::encode_method_call(&MethodCall::with_args(method, args))?;
        let reply = self.messenger.send(&self.name, &message);
        Ok(codec::decode_result(&reply)?)
    }
}

/// Bridges raw channel messages to a `MethodCallHandler`.
struct MethodCallAdapter {
    channel: String,
    handler: Arc<dyn MethodCallHandler>,
}

impl MessageHandler for MethodCallAdapter {
    fn on_message(&self, message: &[u8]) -> Vec<u8> {
        let result = match codec::decode_method_call(message) {
            Ok(call) => self.handler.on_method_call(&call),
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "Rejected undecodable method call");
                MethodResult::error("bad-request", e.to_string())
            }
        };

        codec::encode_result(&result).unwrap_or_else(|e| {
            warn!(channel = %self.channel, error = %e, "Failed to encode reply");
            Vec::new()
        })
    }
}

/// Request posted to the platform runner.
struct RunnerRequest {
    channel: String,
    message: Vec<u8>,
    reply_tx: Sender<Vec<u8>>,
}

enum RunnerCommand {
    Deliver(RunnerRequest),
    Shutdown,
}

/// Dedicated thread that delivers messages to the messenger one at a time.
pub struct PlatformRunner;

impl PlatformRunner {
    /// Spawn the runner thread and return a handle to it.
    pub fn spawn(messenger: Messenger) -> PlatformRunnerHandle {
        let (cmd_tx, cmd_rx) = bounded::<RunnerCommand>(32);

        let thread = thread::spawn(move || {
            info!("Platform runner thread started");
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    RunnerCommand::Deliver(request) => {
                        let reply = messenger.send(&request.channel, &request.message);
                        let _ = request.reply_tx.send(reply);
                    }
                    RunnerCommand::Shutdown => break,
                }
            }
            info!("Platform runner thread exiting");
        });

        PlatformRunnerHandle { cmd_tx, thread: Some(thread) }
    }
}

/// Handle to post messages to the platform runner.
pub struct PlatformRunnerHandle {
    cmd_tx: Sender<RunnerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl PlatformRunnerHandle {
    /// Post a message; the reply arrives on the returned receiver.
    pub fn post(&self, channel: &str, message: Vec<u8>) -> ChannelResult<Receiver<Vec<u8>>> {
        let (reply_tx, reply_rx) = bounded(1);
        let request = RunnerRequest { channel: channel.to_string(), message, reply_tx };
        self.cmd_tx
            .send(RunnerCommand::Deliver(request))
            .map_err(|_| ChannelError::RunnerStopped)?;
        Ok(reply_rx)
    }

    /// Post a message and wait for its reply.
    pub fn send(&self, channel: &str, message: Vec<u8>) -> ChannelResult<Vec<u8>> {
        self.post(channel, message)?.recv().map_err(|_| ChannelError::RunnerStopped)
    }

    /// Encode a method call, run it on the runner thread, decode the reply.
    pub fn invoke_method(&self, channel: &str, call: &MethodCall) -> ChannelResult<MethodResult> {
        let reply = self.send(channel, codec::encode_method_call(call)?)?;
        Ok(codec::decode_result(&reply)?)
    }

    /// Stop the runner and wait for its thread to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.cmd_tx.send(RunnerCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PlatformRunnerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DensityQueryService, FixedDisplayMetrics};
    use serde_json::json;

    struct Echo;

    impl MessageHandler for Echo {
        fn on_message(&self, message: &[u8]) -> Vec<u8> {
            message.to_vec()
        }
    }

    fn density_channel(messenger: &Messenger, ppi: f64) -> MethodChannel {
        let channel = MethodChannel::new(messenger, "measure");
        channel.set_method_call_handler(Some(Arc::new(DensityQueryService::new(FixedDisplayMetrics(ppi)))));
        channel
    }

    #[test]
    fn test_send_without_handler_replies_empty() {
        let messenger = Messenger::new();
        assert!(messenger.send("missing", b"hello").is_empty());
    }

    #[test]
    fn test_register_and_remove_handler() {
        let messenger = Messenger::new();
        messenger.set_message_handler("echo", Some(Arc::new(Echo)));
        assert!(messenger.has_handler("echo"));
        assert_eq!(messenger.send("echo", b"ping"), b"ping".to_vec());

        messenger.set_message_handler("echo", None);
        assert!(!messenger.has_handler("echo"));
        assert!(messenger.send("echo", b"ping").is_empty());
    }

    #[test]
    fn test_invoke_supported_method() {
        let messenger = Messenger::new();
        let channel = density_channel(&messenger, 326.0);
        let result = channel.invoke_method("getPhysicalPixelsPerInch", Value::Null).unwrap();
        assert_eq!(result.as_f64(), Some(326.0));
    }

    #[test]
    fn test_invoke_unknown_method() {
        let messenger = Messenger::new();
        let channel = density_channel(&messenger, 326.0);
        assert!(channel.invoke_method("someOtherMethod", Value::Null).unwrap().is_not_implemented());
        assert!(channel.invoke_method("", json!([1, 2])).unwrap().is_not_implemented());
    }

    #[test]
    fn test_undecodable_call_gets_error_reply() {
        let messenger = Messenger::new();
        density_channel(&messenger, 160.0);
        let reply = messenger.send("measure", b"{\"args\":null}");
        match codec::decode_result(&reply).unwrap() {
            MethodResult::Error { code, .. } => assert_eq!(code, "bad-request"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_cleared_channel_is_not_implemented() {
        let messenger = Messenger::new();
        let channel = density_channel(&messenger, 160.0);
        channel.set_method_call_handler(None);
        assert!(channel.invoke_method("getPhysicalPixelsPerInch", Value::Null).unwrap().is_not_implemented());
    }

    #[test]
    fn test_platform_runner_round_trip() {
        let messenger = Messenger::new();
        density_channel(&messenger, 401.0);
        let runner = PlatformRunner::spawn(messenger);

        let call = MethodCall::new("getPhysicalPixelsPerInch");
        let first = runner.invoke_method("measure", &call).unwrap();
        let second = runner.invoke_method("measure", &call).unwrap();
        assert_eq!(first.as_f64(), Some(401.0));
        assert_eq!(first, second);

        let other = runner.invoke_method("measure", &MethodCall::new("someOtherMethod")).unwrap();
        assert!(other.is_not_implemented());

        runner.shutdown();
    }

    #[test]
    fn test_handlers_callable_from_many_threads() {
        let messenger = Messenger::new();
        let channel = density_channel(&messenger, 160.0);

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let channel = channel.clone();
                thread::spawn(move || channel.invoke_method("getPhysicalPixelsPerInch", Value::Null).unwrap())
            })
            .collect();

        for t in threads {
            assert_eq!(t.join().unwrap().as_f64(), Some(160.0));
        }
    }
}
