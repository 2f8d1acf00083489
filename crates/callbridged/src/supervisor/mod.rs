//! Worker lifecycle supervision.
//!
//! The [`Supervisor`] runs discovery once, seals the registry, and then
//! starts the transport in the foreground while a [`HealthTimer`] publishes
//! snapshots in the background. When the transport returns without a
//! shutdown request, the [`RestartState`] decides between a delayed restart
//! and a terminal failure. Termination signals raise the shared
//! [`ShutdownFlag`]; every loop observes it between blocking steps.

mod errors;
mod health_timer;
mod policy;
mod shutdown;
mod state;
mod stats;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use callbridge_config::Config;

use crate::discovery::{DiscoveryScanner, SourceUnit};
use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::registry::{Registry, RegistryBuilder};
use crate::transport::{TransportError, TransportExit, TransportFactory};

pub use self::errors::SupervisorError;
pub use self::health_timer::{HealthTimer, write_snapshot};
pub use self::policy::{DenyReason, RestartDecision, RestartPolicy, RestartState};
pub use self::shutdown::{ShutdownError, ShutdownFlag, ShutdownSignal, SystemShutdownSignal};
pub use self::state::SupervisorState;
pub use self::stats::{HealthSnapshot, SupervisorStats};

pub(crate) const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");

/// Supervisor settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Restart limits.
    pub policy: RestartPolicy,
    /// Where health snapshots are written.
    pub health_path: PathBuf,
    /// Interval between health snapshots.
    pub health_interval: Duration,
    /// Discovery roots in search order.
    pub discovery_roots: Vec<String>,
    /// Identity fragments marking host-side units.
    pub host_markers: Vec<String>,
    /// Per-call timeout, if any.
    pub call_timeout: Option<Duration>,
}

impl SupervisorSettings {
    /// Reads the settings from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: RestartPolicy::from_config(config),
            health_path: config.health_path().as_std_path().to_path_buf(),
            health_interval: config.health_interval(),
            discovery_roots: config.discovery_roots(),
            host_markers: config.host_markers(),
            call_timeout: config.call_timeout(),
        }
    }
}

/// Owns the worker lifecycle from discovery to shutdown.
pub struct Supervisor<F> {
    settings: SupervisorSettings,
    units: &'static [SourceUnit],
    factory: F,
    reporter: Arc<dyn HealthReporter>,
    stats: Arc<SupervisorStats>,
}

impl<F> Supervisor<F>
where
    F: TransportFactory,
{
    /// Creates a supervisor over the given catalogue and transport factory.
    #[must_use]
    pub fn new(
        settings: SupervisorSettings,
        units: &'static [SourceUnit],
        factory: F,
        reporter: Arc<dyn HealthReporter>,
        shutdown: ShutdownFlag,
    ) -> Self {
        let stats = Arc::new(SupervisorStats::new(settings.policy, shutdown));
        Self {
            settings,
            units,
            factory,
            reporter,
            stats,
        }
    }

    /// Shared counters, for inspection.
    #[must_use]
    pub const fn stats(&self) -> &Arc<SupervisorStats> {
        &self.stats
    }

    /// Runs until shutdown or until a restart is denied.
    ///
    /// A final health snapshot is written on every exit path.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::RestartDenied`] when the transport cannot
    /// be restarted, and [`SupervisorError::HealthTimer`] when the timer
    /// thread cannot be started.
    pub fn run(&self) -> Result<(), SupervisorError> {
        self.stats.transition(SupervisorState::Starting);
        let registry = self.discover();
        let dispatcher = Dispatcher::new(registry).with_call_timeout(self.settings.call_timeout);
        let timer = HealthTimer::spawn(
            Arc::clone(&self.stats),
            self.settings.health_path.clone(),
            self.settings.health_interval,
        )
        .map_err(|source| SupervisorError::HealthTimer { source })?;

        let outcome = self.supervise(&dispatcher);
        let final_state = if outcome.is_ok() {
            self.stats.transition(SupervisorState::Stopping);
            SupervisorState::Stopped
        } else {
            SupervisorState::Failed
        };
        timer.stop();
        self.stats.transition(final_state);
        health_timer::publish(&self.stats, &self.settings.health_path);
        self.reporter.shutdown_completed(final_state);
        outcome
    }

    fn discover(&self) -> Registry {
        let mut builder = RegistryBuilder::new();
        let report = DiscoveryScanner::new(self.units)
            .with_roots(self.settings.discovery_roots.clone())
            .with_host_markers(self.settings.host_markers.clone())
            .scan(&mut builder);
        self.reporter.discovery_completed(&report);
        let registry = builder.seal();
        self.stats.set_function_count(registry.len());
        registry
    }

    fn supervise(&self, dispatcher: &Dispatcher) -> Result<(), SupervisorError> {
        let shutdown = self.stats.shutdown();
        loop {
            if shutdown.is_raised() {
                return Ok(());
            }
            self.stats.transition(SupervisorState::Running);
            self.stats.mark_started(Instant::now());
            let failure = match self.serve_once(dispatcher) {
                Ok(TransportExit::Shutdown) => return Ok(()),
                Ok(TransportExit::ChannelClosed) => None,
                Err(error) => Some(error),
            };
            if shutdown.is_raised() {
                return Ok(());
            }

            match self.stats.evaluate_restart(Instant::now()) {
                RestartDecision::Restart { attempt, backoff } => {
                    self.stats.transition(SupervisorState::Restarting);
                    self.reporter.restart_scheduled(attempt, backoff);
                    if !shutdown.sleep(backoff) {
                        return Ok(());
                    }
                    self.stats.transition(SupervisorState::Starting);
                }
                RestartDecision::Deny(reason) => {
                    self.reporter.restart_denied(&reason);
                    return Err(SupervisorError::RestartDenied {
                        reason,
                        restart_count: self.stats.restart_count(),
                        last_error: failure.map(|error| error.to_string()),
                    });
                }
            }
        }
    }

    fn serve_once(&self, dispatcher: &Dispatcher) -> Result<TransportExit, TransportError> {
        let mut transport = self.factory.create().inspect_err(|error| {
            self.reporter.transport_failed("unavailable", error);
        })?;
        let name = transport.name();
        self.reporter.transport_started(name, self.stats.restart_count());
        match transport.serve(dispatcher, self.stats.shutdown()) {
            Ok(exit) => {
                self.reporter.transport_stopped(name, exit);
                Ok(exit)
            }
            Err(error) => {
                self.reporter.transport_failed(name, &error);
                Err(error)
            }
        }
    }
}
