//! A supervised JSON-RPC worker that exposes registered functions to a host
//! process.
//!
//! The host and the worker exchange JSON-RPC 2.0 messages over one of two
//! transports configured through [`callbridge_config`]: newline-delimited
//! frames on standard input and output, or request and response artefacts
//! polled in an exchange directory. Functions are declared as
//! [`registry::FunctionDescriptor`] values grouped into
//! [`discovery::SourceUnit`] entries; the [`discovery::DiscoveryScanner`]
//! loads the units selected by the configured roots into a registry, which
//! is sealed before the first request is served.
//!
//! Each request is decoded by the [`codec`], bound against the target's
//! declared parameters, and executed by the [`dispatch::Dispatcher`]. Failures
//! inside a call never escape as panics: they come back as JSON-RPC error
//! objects and the worker keeps serving.
//!
//! The [`supervisor::Supervisor`] owns the lifecycle. It restarts the
//! transport with progressive backoff when the channel drops, stops when a
//! termination signal arrives, and publishes a health snapshot on a timer so
//! the host can observe the worker without talking to it.

mod bootstrap;
pub mod catalog;
pub mod codec;
pub mod discovery;
pub mod dispatch;
mod files;
mod health;
mod launch;
pub mod registry;
pub mod supervisor;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, StaticConfigLoader, SystemConfigLoader, Worker, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use launch::{LaunchError, run_worker};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
