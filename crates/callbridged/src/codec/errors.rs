//! Error codes and descriptors carried in failure responses.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::request::RequestId;

/// Closed set of error codes reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCode {
    /// The frame was not valid JSON.
    ParseError,
    /// The JSON was not a valid request envelope.
    InvalidRequest,
    /// No function is registered under the requested name.
    MethodNotFound,
    /// Arguments were missing, unexpected, or not coercible.
    InvalidParams,
    /// The target failed while executing.
    InternalError,
}

impl RpcErrorCode {
    /// Numeric code placed on the wire.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Maps a wire code back to the closed set.
    #[cfg(test)]
    pub(crate) const fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(Self::ParseError),
            -32600 => Some(Self::InvalidRequest),
            -32601 => Some(Self::MethodNotFound),
            -32602 => Some(Self::InvalidParams),
            -32603 => Some(Self::InternalError),
            _ => None,
        }
    }
}

/// Error object embedded in a failure response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescriptor {
    /// Numeric error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorDescriptor {
    /// Creates a descriptor without structured data.
    #[must_use]
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Attaches structured data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the typed code when it belongs to the closed set.
    #[cfg(test)]
    pub(crate) const fn kind(&self) -> Option<RpcErrorCode> {
        RpcErrorCode::from_code(self.code)
    }
}

/// Failures surfaced while decoding or encoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame was not valid JSON.
    #[error("parse error: {message}")]
    Parse {
        /// Description of the syntax failure.
        message: String,
        /// Underlying JSON error.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The frame was JSON but not a valid request envelope.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the structural failure.
        message: String,
        /// Request id as read; `None` when the envelope carried no id and
        /// `null` when it could not be read.
        id: Option<RequestId>,
    },
    /// A response could not be serialised.
    #[error("failed to serialise response: {0}")]
    Encode(#[source] serde_json::Error),
}

impl CodecError {
    /// Creates a parse error from a serde failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Parse {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>, id: Option<RequestId>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            id,
        }
    }

    /// Error descriptor reported to the caller, when the failure is per-frame.
    #[must_use]
    pub fn descriptor(&self) -> ErrorDescriptor {
        match self {
            Self::Parse { message, .. } => {
                ErrorDescriptor::new(RpcErrorCode::ParseError, format!("Parse error: {message}"))
            }
            Self::InvalidRequest { message, .. } => ErrorDescriptor::new(
                RpcErrorCode::InvalidRequest,
                format!("Invalid request: {message}"),
            ),
            Self::Encode(source) => ErrorDescriptor::new(
                RpcErrorCode::InternalError,
                format!("failed to serialise response: {source}"),
            ),
        }
    }

    /// Id echoed in the error response. Parse failures answer `null`; an
    /// invalid request echoes its id, including absence.
    #[must_use]
    pub fn response_id(&self) -> Option<RequestId> {
        match self {
            Self::InvalidRequest { id, .. } => id.clone(),
            Self::Parse { .. } | Self::Encode(_) => Some(RequestId::null()),
        }
    }
}
