//! Response envelopes and frame encoding.

use serde::Serialize;
use serde_json::Value;

use super::errors::{CodecError, ErrorDescriptor};
use super::request::{JSONRPC_VERSION, RequestId};

/// Exactly one of a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The call succeeded with this value.
    Result(Value),
    /// The call failed.
    Error(ErrorDescriptor),
}

/// Response frame sent back to the host.
///
/// The `id` member is omitted entirely when the request carried none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(flatten)]
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<RequestId>,
}

impl RpcResponse {
    /// Creates a success response.
    #[must_use]
    pub const fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: Outcome::Result(result),
            id,
        }
    }

    /// Creates a failure response.
    #[must_use]
    pub const fn failure(id: Option<RequestId>, error: ErrorDescriptor) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            outcome: Outcome::Error(error),
            id,
        }
    }

    /// Builds the response for a frame that could not be decoded.
    #[must_use]
    pub fn from_codec_error(error: &CodecError) -> Self {
        Self::failure(error.response_id(), error.descriptor())
    }

    /// Result or error carried by the response.
    #[must_use]
    pub const fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Echoed correlation id.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    /// Returns true for success responses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Result(_))
    }

    /// Serialises the complete frame, without the line delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(CodecError::Encode)
    }
}
