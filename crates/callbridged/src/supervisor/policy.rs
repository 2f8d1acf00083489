//! Restart budget and progressive backoff.

use std::fmt;
use std::time::{Duration, Instant};

use callbridge_config::Config;

/// Static restart limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Restarts allowed over the process lifetime.
    pub max_restarts: u32,
    /// Minimum time since the last transport start before a restart.
    pub cooldown: Duration,
    /// Delay added per restart attempt.
    pub backoff_unit: Duration,
    /// Upper bound on the delay.
    pub backoff_cap: Duration,
}

impl RestartPolicy {
    /// Reads the limits from configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self {
            max_restarts: config.max_restarts(),
            cooldown: config.restart_cooldown(),
            backoff_unit: config.backoff_unit(),
            backoff_cap: config.backoff_cap(),
        }
    }

    /// Delay before restart number `attempt`: `min(attempt × unit, cap)`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit
            .checked_mul(attempt)
            .map_or(self.backoff_cap, |delay| delay.min(self.backoff_cap))
    }
}

/// Why a restart was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The restart budget is spent.
    Exhausted {
        /// Configured budget.
        max_restarts: u32,
    },
    /// The transport failed too soon after its last start.
    Cooldown {
        /// Time since the last start.
        elapsed: Duration,
        /// Required cooldown.
        cooldown: Duration,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { max_restarts } => {
                write!(f, "maximum restarts ({max_restarts}) reached")
            }
            Self::Cooldown { elapsed, cooldown } => write!(
                f,
                "still in restart cooldown ({} ms of {} ms elapsed)",
                elapsed.as_millis(),
                cooldown.as_millis()
            ),
        }
    }
}

/// Result of evaluating the restart policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    /// Restart after sleeping for `backoff`.
    Restart {
        /// Restart number, starting at one.
        attempt: u32,
        /// Delay before the next start.
        backoff: Duration,
    },
    /// Do not restart.
    Deny(DenyReason),
}

/// Mutable restart bookkeeping owned by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartState {
    policy: RestartPolicy,
    restart_count: u32,
    last_restart: Option<Instant>,
}

impl RestartState {
    /// Creates bookkeeping with no restarts recorded.
    #[must_use]
    pub const fn new(policy: RestartPolicy) -> Self {
        Self {
            policy,
            restart_count: 0,
            last_restart: None,
        }
    }

    /// Limits in force.
    #[must_use]
    pub const fn policy(&self) -> &RestartPolicy {
        &self.policy
    }

    /// Restarts performed so far.
    #[must_use]
    pub const fn restart_count(&self) -> u32 {
        self.restart_count
    }

    /// Instant the transport last started.
    #[must_use]
    pub const fn last_restart(&self) -> Option<Instant> {
        self.last_restart
    }

    /// Records that the transport started at `now`.
    pub const fn mark_started(&mut self, now: Instant) {
        self.last_restart = Some(now);
    }

    /// Decides whether the transport may restart at `now`.
    ///
    /// A granted restart increments the counter before the backoff is
    /// computed, so the first restart waits one backoff unit.
    pub fn evaluate(&mut self, now: Instant) -> RestartDecision {
        if self.restart_count >= self.policy.max_restarts {
            return RestartDecision::Deny(DenyReason::Exhausted {
                max_restarts: self.policy.max_restarts,
            });
        }
        if let Some(started) = self.last_restart {
            let elapsed = now.saturating_duration_since(started);
            if elapsed < self.policy.cooldown {
                return RestartDecision::Deny(DenyReason::Cooldown {
                    elapsed,
                    cooldown: self.policy.cooldown,
                });
            }
        }
        self.restart_count += 1;
        RestartDecision::Restart {
            attempt: self.restart_count,
            backoff: self.policy.backoff_for(self.restart_count),
        }
    }
}
