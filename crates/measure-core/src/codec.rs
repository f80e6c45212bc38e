//! JSON method codec.
//!
//! Envelope layout:
//! - call: `{"method": "<name>", "args": <value>}`
//! - success: `[<value>]`
//! - error: `["<code>", <message>, <details>]`
//! - not implemented: empty reply

use crate::{MethodCall, MethodResult};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

/// Encode a method call for sending.
pub fn encode_method_call(call: &MethodCall) -> CodecResult<Vec<u8>> {
    Ok(serde_json::to_vec(call)?)
}

/// Decode a method call received on a channel.
pub fn decode_method_call(bytes: &[u8]) -> CodecResult<MethodCall> {
    let value: Value = serde_json::from_slice(bytes)?;
    match value.get("method") {
        Some(Value::String(_)) => Ok(serde_json::from_value(value)?),
        Some(other) => Err(CodecError::InvalidEnvelope(format!("method must be a string, got {}", other))),
        None => Err(CodecError::InvalidEnvelope("missing method".into())),
    }
}

/// Encode a result as a reply. `NotImplemented` becomes an empty reply.
pub fn encode_result(result: &MethodResult) -> CodecResult<Vec<u8>> {
    let envelope = match result {
        MethodResult::Success(value) => Value::Array(vec![value.clone()]),
        MethodResult::Error { code, message, details } => Value::Array(vec![
            Value::String(code.clone()),
            message.clone().map(Value::String).unwrap_or(Value::Null),
            details.clone().unwrap_or(Value::Null),
        ]),
        MethodResult::NotImplemented => return Ok(Vec::new()),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a reply envelope. An empty reply means not implemented.
pub fn decode_result(bytes: &[u8]) -> CodecResult<MethodResult> {
    if bytes.is_empty() {
        return Ok(MethodResult::NotImplemented);
    }

    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(mut items) = value else {
        return Err(CodecError::InvalidEnvelope("reply must be an array".into()));
    };

    match items.len() {
        1 => Ok(MethodResult::Success(items.remove(0))),
        3 => {
            let details = items.pop().filter(|v| !v.is_null());
            let message = match items.pop() {
                Some(Value::String(message)) => Some(message),
                Some(Value::Null) | None => None,
                Some(other) => {
                    return Err(CodecError::InvalidEnvelope(format!("error message must be a string, got {}", other)))
                }
            };
            match items.pop() {
                Some(Value::String(code)) => Ok(MethodResult::Error { code, message, details }),
                _ => Err(CodecError::InvalidEnvelope("error code must be a string".into())),
            }
        }
        n => Err(CodecError::InvalidEnvelope(format!("unexpected reply length {}", n))),
    }
}
