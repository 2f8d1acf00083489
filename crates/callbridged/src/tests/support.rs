//! Test doubles shared by the lifecycle suites.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use callbridge_config::{Config, TransportKind};

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::catalog;
use crate::discovery::{DiscoveryReport, DiscoveryScanner};
use crate::dispatch::Dispatcher;
use crate::health::HealthReporter;
use crate::registry::RegistryBuilder;
use crate::supervisor::{DenyReason, ShutdownFlag, SupervisorState};
use crate::transport::{Transport, TransportError, TransportExit, TransportFactory};

/// Builds a configuration whose artefacts live under `dir`.
pub fn config_in(dir: &TempDir) -> Config {
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 temp dir");
    Config {
        transport: TransportKind::File,
        exchange_dir: root.join("exchange"),
        health_path: root.join("status/health.json"),
        poll_interval_ms: 10,
        ..Config::default()
    }
}

/// Dispatcher over every unit in the built-in catalogue.
pub fn catalogue_dispatcher() -> Dispatcher {
    let mut builder = RegistryBuilder::new();
    DiscoveryScanner::new(catalog::UNITS).scan(&mut builder);
    Dispatcher::new(builder.seal())
}

/// Loader that fails by passing an unknown transport on the command line.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("callbridged"),
            OsString::from("--transport"),
            OsString::from("carrier-pigeon"),
        ];
        Config::load_from_iter(args)
    }
}

/// Structured health events tracked by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    DiscoveryCompleted { loaded: usize, functions: usize },
    TransportStarted { transport: String, restart_count: u32 },
    TransportStopped(TransportExit),
    TransportFailed(String),
    RestartScheduled(u32),
    RestartDenied(DenyReason),
    ShutdownCompleted(SupervisorState),
}

/// Records health events for assertions.
#[derive(Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn discovery_completed(&self, report: &DiscoveryReport) {
        self.record(HealthEvent::DiscoveryCompleted {
            loaded: report.loaded,
            functions: report.function_count,
        });
    }

    fn transport_started(&self, transport: &str, restart_count: u32) {
        self.record(HealthEvent::TransportStarted {
            transport: transport.to_owned(),
            restart_count,
        });
    }

    fn transport_stopped(&self, _transport: &str, exit: TransportExit) {
        self.record(HealthEvent::TransportStopped(exit));
    }

    fn transport_failed(&self, transport: &str, _error: &TransportError) {
        self.record(HealthEvent::TransportFailed(transport.to_owned()));
    }

    fn restart_scheduled(&self, attempt: u32, _backoff: Duration) {
        self.record(HealthEvent::RestartScheduled(attempt));
    }

    fn restart_denied(&self, reason: &DenyReason) {
        self.record(HealthEvent::RestartDenied(*reason));
    }

    fn shutdown_completed(&self, state: SupervisorState) {
        self.record(HealthEvent::ShutdownCompleted(state));
    }
}

/// What one scripted transport does when served.
#[derive(Debug, Clone)]
pub enum Step {
    /// Returns as if the host closed the channel.
    Close,
    /// Fails with a write error.
    Fail,
    /// Raises the shutdown flag, then returns as if the channel closed.
    RaiseAndClose,
    /// Returns after observing shutdown.
    Shutdown,
}

/// Factory handing out one scripted transport per start. Once the script is
/// exhausted, creation fails.
#[derive(Default)]
pub struct ScriptedFactory {
    steps: Mutex<VecDeque<Step>>,
    created: Mutex<u32>,
}

impl ScriptedFactory {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            created: Mutex::new(0),
        }
    }

    /// Transports created so far.
    pub fn created(&self) -> u32 {
        *self.created.lock().expect("factory mutex poisoned")
    }
}

impl TransportFactory for Arc<ScriptedFactory> {
    fn create(&self) -> Result<Box<dyn Transport>, TransportError> {
        let step = self
            .steps
            .lock()
            .expect("factory mutex poisoned")
            .pop_front()
            .ok_or_else(|| TransportError::ReaderThread {
                source: Arc::new(std::io::Error::other("script exhausted")),
            })?;
        *self.created.lock().expect("factory mutex poisoned") += 1;
        Ok(Box::new(ScriptedTransport { step }))
    }
}

struct ScriptedTransport {
    step: Step,
}

impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn serve(
        &mut self,
        _dispatcher: &Dispatcher,
        shutdown: &ShutdownFlag,
    ) -> Result<TransportExit, TransportError> {
        match self.step {
            Step::Close => Ok(TransportExit::ChannelClosed),
            Step::Fail => Err(TransportError::write(std::io::Error::other("host went away"))),
            Step::RaiseAndClose => {
                shutdown.raise();
                Ok(TransportExit::ChannelClosed)
            }
            Step::Shutdown => {
                shutdown.raise();
                Ok(TransportExit::Shutdown)
            }
        }
    }
}
