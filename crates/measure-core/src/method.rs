//! Method calls and their results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operations understood by the measure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Horizontal physical pixel density of the primary display.
    GetPhysicalPixelsPerInch,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Method; 1] = [Method::GetPhysicalPixelsPerInch];

    /// Resolve a wire name. Unknown names (including "") yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getPhysicalPixelsPerInch" => Some(Self::GetPhysicalPixelsPerInch),
            _ => None,
        }
    }

    /// Wire name of the method.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetPhysicalPixelsPerInch => "getPhysicalPixelsPerInch",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An incoming request: method name plus arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), args: Value::Null }
    }

    pub fn with_args(method: impl Into<String>, args: Value) -> Self {
        Self { method: method.into(), args }
    }

    /// The closed method this call dispatches to, if any.
    pub fn resolve(&self) -> Option<Method> {
        Method::from_name(&self.method)
    }
}

/// Outcome of a single method call. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum MethodResult {
    /// The call succeeded with a value.
    Success(Value),
    /// The call was recognized but failed.
    Error {
        code: String,
        message: Option<String>,
        details: Option<Value>,
    },
    /// No handler knows this method.
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error { code: code.into(), message: Some(message.into()), details: None }
    }

    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }

    /// The success value as a float, if this is a numeric success.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Success(value) => value.as_f64(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_from_name() {
        assert_eq!(
            Method::from_name("getPhysicalPixelsPerInch"),
            Some(Method::GetPhysicalPixelsPerInch)
        );
        assert_eq!(Method::from_name("someOtherMethod"), None);
        assert_eq!(Method::from_name(""), None);
        // Names are case sensitive.
        assert_eq!(Method::from_name("GetPhysicalPixelsPerInch"), None);
    }

    #[test]
    fn test_method_names_resolve_back() {
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
    }

    #[test]
    fn test_method_call_deserialize_without_args() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"getPhysicalPixelsPerInch"}"#).unwrap();
        assert_eq!(call.args, Value::Null);
        assert_eq!(call.resolve(), Some(Method::GetPhysicalPixelsPerInch));
    }

    #[test]
    fn test_method_result_serialization() {
        let success = serde_json::to_value(MethodResult::success(326.0)).unwrap();
        assert_eq!(success, json!({"status": "success", "value": 326.0}));

        let not_impl = serde_json::to_value(MethodResult::NotImplemented).unwrap();
        assert_eq!(not_impl, json!({"status": "notImplemented"}));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(MethodResult::success(160.0).as_f64(), Some(160.0));
        assert_eq!(MethodResult::NotImplemented.as_f64(), None);
        assert_eq!(MethodResult::error("x", "y").as_f64(), None);
    }
}
