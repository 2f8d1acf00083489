//! Method routing: reserved meta-methods first, then the registry.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::binding::bind;
use super::errors::DispatchError;
use super::invoke::invoke;
use crate::codec::{Params, RpcRequest, RpcResponse, is_blank};
use crate::registry::Registry;

/// Reserved method returning the description of every registered function.
pub const LIST_FUNCTIONS: &str = "list_functions";
/// Reserved method reporting liveness and the registry size.
pub const HEALTH_CHECK: &str = "health_check";

/// Reserved methods answered without consulting the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaMethod {
    /// See [`LIST_FUNCTIONS`].
    ListFunctions,
    /// See [`HEALTH_CHECK`].
    HealthCheck,
}

impl MetaMethod {
    /// Recognises a reserved method name.
    #[must_use]
    pub fn parse(method: &str) -> Option<Self> {
        match method {
            LIST_FUNCTIONS => Some(Self::ListFunctions),
            HEALTH_CHECK => Some(Self::HealthCheck),
            _ => None,
        }
    }

    /// Canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListFunctions => LIST_FUNCTIONS,
            Self::HealthCheck => HEALTH_CHECK,
        }
    }
}

/// Resolves, binds, and invokes calls against a sealed registry.
///
/// The dispatcher is shared by both transports. It never fails as a whole:
/// every call produces either a value or a [`DispatchError`] that maps onto
/// a protocol error code.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    call_timeout: Option<Duration>,
}

impl Dispatcher {
    /// Creates a dispatcher without a call timeout.
    #[must_use]
    pub const fn new(registry: Registry) -> Self {
        Self {
            registry,
            call_timeout: None,
        }
    }

    /// Sets the per-call timeout. `None` disables it.
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Registry the dispatcher resolves against.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Executes a call by name.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the method is unknown, the arguments do
    /// not bind, or the target fails.
    pub fn call(&self, method: &str, params: &Params) -> Result<Value, DispatchError> {
        if let Some(meta) = MetaMethod::parse(method) {
            debug!(target: DISPATCH_TARGET, method = meta.as_str(), "meta-method");
            return Ok(self.meta(meta));
        }

        let descriptor = self
            .registry
            .lookup(method)
            .ok_or_else(|| DispatchError::method_not_found(method))?;
        let args = bind(&descriptor, params)?;
        debug!(
            target: DISPATCH_TARGET,
            method,
            arguments = args.len(),
            "invoking function"
        );
        invoke(&descriptor, args, self.call_timeout)
    }

    /// Dispatches a decoded request.
    ///
    /// Returns `None` for notifications that succeed; failed notifications
    /// are still answered, with the `id` member omitted.
    #[must_use]
    pub fn dispatch(&self, request: &RpcRequest) -> Option<RpcResponse> {
        let id = request.id().cloned();
        match self.call(request.method(), request.params()) {
            Ok(_) if request.is_notification() => None,
            Ok(result) => Some(RpcResponse::success(id, result)),
            Err(error) => {
                log_failure(request.method(), &error);
                Some(RpcResponse::failure(id, error.descriptor()))
            }
        }
    }

    /// Decodes and dispatches one raw frame.
    ///
    /// Blank frames are ignored. Frames that fail to decode yield a parse or
    /// invalid-request error response.
    #[must_use]
    pub fn handle_frame(&self, frame: &[u8]) -> Option<RpcResponse> {
        if is_blank(frame) {
            return None;
        }
        match RpcRequest::decode(frame) {
            Ok(request) => self.dispatch(&request),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, error = %error, "rejected frame");
                Some(RpcResponse::from_codec_error(&error))
            }
        }
    }

    fn meta(&self, meta: MetaMethod) -> Value {
        match meta {
            MetaMethod::ListFunctions => self.registry.describe(),
            MetaMethod::HealthCheck => json!({
                "status": "ok",
                "function_count": self.registry.len(),
            }),
        }
    }
}

fn log_failure(method: &str, error: &DispatchError) {
    warn!(
        target: DISPATCH_TARGET,
        method,
        code = error.code().code(),
        error = %error,
        "call failed"
    );
}
