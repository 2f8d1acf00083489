//! Structured health reporting for worker lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use callbridge_config::Config;

use crate::bootstrap::BootstrapError;
use crate::discovery::DiscoveryReport;
use crate::supervisor::{DenyReason, SupervisorState};
use crate::transport::{TransportError, TransportExit};

pub(crate) const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once discovery has populated the registry.
    fn discovery_completed(&self, report: &DiscoveryReport);

    /// Invoked each time a transport starts serving.
    fn transport_started(&self, transport: &str, restart_count: u32);

    /// Invoked when a transport returns normally.
    fn transport_stopped(&self, transport: &str, exit: TransportExit);

    /// Invoked when a transport fails or cannot be created.
    fn transport_failed(&self, transport: &str, error: &TransportError);

    /// Invoked when a restart has been granted, before the backoff.
    fn restart_scheduled(&self, attempt: u32, backoff: Duration);

    /// Invoked when the restart policy refuses another start.
    fn restart_denied(&self, reason: &DenyReason);

    /// Invoked once the supervisor reaches a terminal state.
    fn shutdown_completed(&self, state: SupervisorState);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn discovery_completed(&self, report: &DiscoveryReport) {
        (**self).discovery_completed(report);
    }

    fn transport_started(&self, transport: &str, restart_count: u32) {
        (**self).transport_started(transport, restart_count);
    }

    fn transport_stopped(&self, transport: &str, exit: TransportExit) {
        (**self).transport_stopped(transport, exit);
    }

    fn transport_failed(&self, transport: &str, error: &TransportError) {
        (**self).transport_failed(transport, error);
    }

    fn restart_scheduled(&self, attempt: u32, backoff: Duration) {
        (**self).restart_scheduled(attempt, backoff);
    }

    fn restart_denied(&self, reason: &DenyReason) {
        (**self).restart_denied(reason);
    }

    fn shutdown_completed(&self, state: SupervisorState) {
        (**self).shutdown_completed(state);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting worker bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            transport = %config.transport(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "worker bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "worker bootstrap failed"
        );
    }

    fn discovery_completed(&self, report: &DiscoveryReport) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "discovery_completed",
            loaded = report.loaded,
            skipped = report.skipped,
            failed = report.failed,
            functions = report.function_count,
            "function discovery completed"
        );
    }

    fn transport_started(&self, transport: &str, restart_count: u32) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "transport_started",
            transport,
            restart_count,
            "transport started"
        );
    }

    fn transport_stopped(&self, transport: &str, exit: TransportExit) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "transport_stopped",
            transport,
            exit = ?exit,
            "transport stopped"
        );
    }

    fn transport_failed(&self, transport: &str, error: &TransportError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "transport_failed",
            transport,
            error = %error,
            "transport failed"
        );
    }

    fn restart_scheduled(&self, attempt: u32, backoff: Duration) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "restart_scheduled",
            attempt,
            backoff_ms = backoff.as_millis(),
            "restarting transport"
        );
    }

    fn restart_denied(&self, reason: &DenyReason) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "restart_denied",
            reason = %reason,
            "transport cannot be restarted"
        );
    }

    fn shutdown_completed(&self, state: SupervisorState) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "shutdown_completed",
            state = %state,
            "worker shutdown complete"
        );
    }
}
