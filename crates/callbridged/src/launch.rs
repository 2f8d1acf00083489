//! Launch sequencing: bootstrap, signal wiring, then supervision.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::bootstrap::{BootstrapError, ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::catalog;
use crate::discovery::SourceUnit;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::supervisor::{
    ShutdownError, ShutdownFlag, ShutdownSignal, Supervisor, SupervisorError, SupervisorSettings,
    SystemShutdownSignal,
};
use crate::transport::ConfiguredTransportFactory;

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Errors surfaced while launching or supervising the worker.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the worker failed.
    #[error("worker bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Installing the shutdown listener failed.
    #[error("failed to install shutdown listener: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
    /// The supervisor stopped on a failure.
    #[error("worker supervision failed: {source}")]
    Supervisor {
        /// Underlying supervisor error.
        #[source]
        source: SupervisorError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

impl From<SupervisorError> for LaunchError {
    fn from(source: SupervisorError) -> Self {
        Self::Supervisor { source }
    }
}

/// Collaborators required to launch the worker.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) shutdown: S,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) units: &'static [SourceUnit],
}

/// Runs the worker with the production collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails, signal handlers cannot be
/// installed, or the transport cannot be kept running.
pub fn run_worker() -> Result<(), LaunchError> {
    run_worker_with(LaunchPlan {
        loader: SystemConfigLoader,
        shutdown: SystemShutdownSignal,
        reporter: Arc::new(StructuredHealthReporter::new()),
        units: catalog::UNITS,
    })
}

/// Runs the worker with injected collaborators.
pub(crate) fn run_worker_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        shutdown,
        reporter,
        units,
    } = plan;

    let worker = bootstrap_with(&loader, reporter)?;
    let config = worker.config();
    info!(
        target: LAUNCH_TARGET,
        transport = %config.transport(),
        "starting worker runtime"
    );

    let flag = ShutdownFlag::new();
    shutdown.install(&flag)?;

    let supervisor = Supervisor::new(
        SupervisorSettings::from_config(config),
        units,
        ConfiguredTransportFactory::new(config),
        worker.reporter(),
        flag,
    );
    supervisor.run()?;
    info!(target: LAUNCH_TARGET, "worker stopped cleanly");
    Ok(())
}
