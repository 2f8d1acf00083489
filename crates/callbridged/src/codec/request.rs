//! Request decoding for the JSON-RPC envelope.
//!
//! Frames are decoded in two steps: the raw bytes must parse as JSON (a
//! failure yields a parse error), and the resulting value must be an object
//! carrying `jsonrpc: "2.0"`, a string `method`, structured or absent
//! `params`, and a scalar or absent `id` (a failure yields an invalid request
//! error). The id is read before any other field so that invalid requests can
//! still echo it.

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::CodecError;

/// Protocol version tag carried by every frame.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id echoed verbatim in the response.
///
/// Only strings, numbers, and `null` are valid ids. Absence of an id is
/// modelled as `Option<RequestId>::None` and marks the request as a
/// notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestId(Value);

impl RequestId {
    /// Wraps a scalar JSON value, rejecting structured and boolean values.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(_) | Value::Number(_) | Value::Null => Some(Self(value)),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The `null` id used when a request id cannot be read.
    #[must_use]
    pub const fn null() -> Self {
        Self(Value::Null)
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_owned()))
    }
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

/// Arguments carried by a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No `params` member (or an explicit `null`).
    #[default]
    Absent,
    /// Arguments keyed by parameter name.
    Named(Map<String, Value>),
    /// Arguments bound in declaration order.
    Positional(Vec<Value>),
}

/// Decoded remote-call request.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    method: String,
    params: Params,
    id: Option<RequestId>,
}

impl RpcRequest {
    /// Builds a request directly, bypassing the wire format.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Params, id: Option<RequestId>) -> Self {
        Self {
            method: method.into(),
            params,
            id,
        }
    }

    /// Decodes a single frame.
    ///
    /// Surrounding ASCII whitespace, including the newline delimiter, is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Parse`] when the frame is not JSON and
    /// [`CodecError::InvalidRequest`] when the envelope is malformed.
    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let trimmed = frame.trim_ascii();
        if trimmed.is_empty() {
            return Err(CodecError::Parse {
                message: String::from("empty frame"),
                source: None,
            });
        }
        let value: Value = serde_json::from_slice(trimmed).map_err(CodecError::from_json_error)?;
        Self::from_value(value)
    }

    /// Validates an already parsed JSON value as a request envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidRequest`] when the envelope is malformed.
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let Value::Object(mut envelope) = value else {
            return Err(CodecError::invalid_request(
                "request must be a JSON object",
                Some(RequestId::null()),
            ));
        };

        let id = match envelope.remove("id") {
            None => None,
            Some(raw) => Some(RequestId::from_value(raw).ok_or_else(|| {
                CodecError::invalid_request(
                    "id must be a string, number, or null",
                    Some(RequestId::null()),
                )
            })?),
        };

        match envelope.get("jsonrpc") {
            Some(Value::String(version)) if version == JSONRPC_VERSION => {}
            _ => {
                return Err(CodecError::invalid_request(
                    format!("jsonrpc must be \"{JSONRPC_VERSION}\""),
                    id,
                ));
            }
        }

        let method = match envelope.remove("method") {
            Some(Value::String(method)) if !method.trim().is_empty() => method,
            Some(Value::String(_)) => {
                return Err(CodecError::invalid_request("method is empty", id));
            }
            _ => return Err(CodecError::invalid_request("method must be a string", id)),
        };

        let params = match envelope.remove("params") {
            None | Some(Value::Null) => Params::Absent,
            Some(Value::Object(named)) => Params::Named(named),
            Some(Value::Array(positional)) => Params::Positional(positional),
            Some(_) => {
                return Err(CodecError::invalid_request(
                    "params must be an object or an array",
                    id,
                ));
            }
        };

        Ok(Self { method, params, id })
    }

    /// Requested method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request arguments.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Correlation id, absent for notifications.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// Returns true when the request carries no id.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Returns true when a frame holds nothing but ASCII whitespace.
#[must_use]
pub fn is_blank(frame: &[u8]) -> bool {
    frame.trim_ascii().is_empty()
}
