use std::io;

use thiserror::Error;

use super::policy::DenyReason;

/// Failures that end the supervisor run.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The transport stopped and the restart policy refused another start.
    #[error("transport cannot be restarted after {restart_count} restarts: {reason}")]
    RestartDenied {
        /// Why the restart was refused.
        reason: DenyReason,
        /// Restarts performed before the refusal.
        restart_count: u32,
        /// Error that stopped the transport, if it failed.
        last_error: Option<String>,
    },
    /// The health timer thread could not be started.
    #[error("failed to start the health timer: {source}")]
    HealthTimer {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
