//! Error types for call resolution, binding, and invocation.
//!
//! Each variant maps onto one protocol error code through
//! [`DispatchError::code`], so the transports never need to inspect the
//! variant themselves.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::codec::{ErrorDescriptor, RpcErrorCode};
use crate::registry::ParamType;

/// Failures surfaced while dispatching a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No function is registered under the requested name.
    #[error("Method not found: {method}")]
    MethodNotFound {
        /// Requested method name.
        method: String,
    },

    /// A required parameter was not supplied.
    #[error("missing required parameter '{name}'")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// A named argument does not match any declared parameter.
    #[error("unexpected parameter '{name}'")]
    UnexpectedParameter {
        /// Supplied argument name.
        name: String,
    },

    /// More positional values were supplied than parameters declared.
    #[error("expected at most {expected} positional arguments, received {received}")]
    TooManyArguments {
        /// Number of declared parameters.
        expected: usize,
        /// Number of supplied values.
        received: usize,
    },

    /// A supplied value cannot be coerced to the declared type.
    #[error("parameter '{name}' expects {expected}, received {received}")]
    Coercion {
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: ParamType,
        /// JSON kind of the supplied value.
        received: &'static str,
    },

    /// The target returned an error.
    #[error("{function} failed: {message}")]
    Target {
        /// Function name.
        function: String,
        /// Message reported by the target.
        message: String,
    },

    /// The target panicked.
    #[error("{function} panicked: {message}")]
    Panicked {
        /// Function name.
        function: String,
        /// Panic payload rendered as text.
        message: String,
    },

    /// The target exceeded the configured call timeout.
    #[error("{function} timed out after {} ms", timeout.as_millis())]
    TimedOut {
        /// Function name.
        function: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// The worker thread for a timed call could not be started.
    #[error("failed to start call thread for {function}: {message}")]
    Spawn {
        /// Function name.
        function: String,
        /// Underlying I/O error rendered as text.
        message: String,
    },
}

impl DispatchError {
    /// Creates a method-not-found error.
    #[must_use]
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates a missing-parameter error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Creates an unexpected-parameter error.
    #[must_use]
    pub fn unexpected_parameter(name: impl Into<String>) -> Self {
        Self::UnexpectedParameter { name: name.into() }
    }

    /// Creates a coercion error.
    #[must_use]
    pub fn coercion(name: impl Into<String>, expected: ParamType, received: &'static str) -> Self {
        Self::Coercion {
            name: name.into(),
            expected,
            received,
        }
    }

    /// Protocol error code for this failure.
    #[must_use]
    pub const fn code(&self) -> RpcErrorCode {
        match self {
            Self::MethodNotFound { .. } => RpcErrorCode::MethodNotFound,
            Self::MissingParameter { .. }
            | Self::UnexpectedParameter { .. }
            | Self::TooManyArguments { .. }
            | Self::Coercion { .. } => RpcErrorCode::InvalidParams,
            Self::Target { .. }
            | Self::Panicked { .. }
            | Self::TimedOut { .. }
            | Self::Spawn { .. } => RpcErrorCode::InternalError,
        }
    }

    /// Error object reported to the caller.
    #[must_use]
    pub fn descriptor(&self) -> ErrorDescriptor {
        let descriptor = ErrorDescriptor::new(self.code(), self.to_string());
        match self {
            Self::MissingParameter { name } | Self::UnexpectedParameter { name } => {
                descriptor.with_data(json!({ "parameter": name }))
            }
            Self::Coercion { name, expected, .. } => {
                descriptor.with_data(json!({ "parameter": name, "expected": expected.as_str() }))
            }
            Self::MethodNotFound { .. }
            | Self::TooManyArguments { .. }
            | Self::Target { .. }
            | Self::Panicked { .. }
            | Self::TimedOut { .. }
            | Self::Spawn { .. } => descriptor,
        }
    }
}
