//! Call dispatch: meta-methods, registry lookup, argument binding, and safe
//! invocation.
//!
//! The reserved methods `list_functions` and `health_check` are answered
//! before the registry is consulted, so user registrations can never shadow
//! them. Every other method is looked up by name, its parameters are bound
//! and coerced (see [`coerce`]), and the target runs under `catch_unwind` so
//! a misbehaving function can never take the transport down.

mod binding;
mod errors;
mod invoke;
mod router;

pub use self::binding::{bind, coerce};
pub use self::errors::DispatchError;
pub use self::router::{Dispatcher, HEALTH_CHECK, LIST_FUNCTIONS, MetaMethod};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
