use std::fmt;

use serde::Serialize;

/// Lifecycle state of the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    /// Discovering functions or preparing the transport.
    #[default]
    Starting,
    /// The transport is serving requests.
    Running,
    /// Waiting out the backoff before the next start.
    Restarting,
    /// Shutdown requested; winding down.
    Stopping,
    /// Shut down cleanly.
    Stopped,
    /// The restart budget was exhausted or denied.
    Failed,
}

impl SupervisorState {
    /// Canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Restarting => "restarting",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Status label published in health snapshots.
    #[must_use]
    pub const fn health_label(self) -> &'static str {
        match self {
            Self::Starting | Self::Running => "healthy",
            Self::Restarting => "degraded",
            Self::Stopping | Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    /// Returns true for states the supervisor never leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
