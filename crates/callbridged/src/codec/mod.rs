//! JSON-RPC 2.0 envelope codec.
//!
//! Decoding failures are terminal for the offending frame only: the caller
//! turns the [`CodecError`] into an error response via
//! [`RpcResponse::from_codec_error`] and keeps the channel open.

mod errors;
mod request;
mod response;

pub use self::errors::{CodecError, ErrorDescriptor, RpcErrorCode};
pub use self::request::{JSONRPC_VERSION, Params, RequestId, RpcRequest, is_blank};
pub use self::response::{Outcome, RpcResponse};
