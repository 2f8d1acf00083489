//! Shared counters read by the health timer and written by the supervisor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::debug;

use super::SUPERVISOR_TARGET;
use super::policy::{RestartDecision, RestartPolicy, RestartState};
use super::shutdown::ShutdownFlag;
use super::state::SupervisorState;

/// Point-in-time health record written to the status artefact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    /// Coarse status label.
    pub status: &'static str,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Seconds since the transport last started; zero before the first start.
    pub uptime: f64,
    /// Functions in the registry.
    pub function_count: usize,
    /// Restarts performed so far.
    pub restart_count: u32,
    /// Supervisor lifecycle state.
    pub state: SupervisorState,
}

/// State shared between the supervisor loop and the health timer.
#[derive(Debug)]
pub struct SupervisorStats {
    restart: Mutex<RestartState>,
    state: Mutex<SupervisorState>,
    function_count: AtomicUsize,
    shutdown: ShutdownFlag,
}

impl SupervisorStats {
    /// Creates stats for a supervisor that has not started yet.
    #[must_use]
    pub fn new(policy: RestartPolicy, shutdown: ShutdownFlag) -> Self {
        Self {
            restart: Mutex::new(RestartState::new(policy)),
            state: Mutex::new(SupervisorState::default()),
            function_count: AtomicUsize::new(0),
            shutdown,
        }
    }

    /// Shutdown flag observed by every loop.
    #[must_use]
    pub const fn shutdown(&self) -> &ShutdownFlag {
        &self.shutdown
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        *lock(&self.state)
    }

    /// Moves to `next` unless the current state is terminal.
    pub fn transition(&self, next: SupervisorState) {
        let mut state = lock(&self.state);
        let previous = *state;
        if previous == next {
            return;
        }
        if previous.is_terminal() {
            debug!(
                target: SUPERVISOR_TARGET,
                state = %previous,
                ignored = %next,
                "state is terminal"
            );
            return;
        }
        *state = next;
        debug!(target: SUPERVISOR_TARGET, from = %previous, to = %next, "state changed");
    }

    /// Records the registry size.
    pub fn set_function_count(&self, count: usize) {
        self.function_count.store(count, Ordering::SeqCst);
    }

    /// Registry size last recorded.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.function_count.load(Ordering::SeqCst)
    }

    /// Restarts performed so far.
    #[must_use]
    pub fn restart_count(&self) -> u32 {
        lock(&self.restart).restart_count()
    }

    /// Stamps the transport start time.
    pub fn mark_started(&self, now: Instant) {
        lock(&self.restart).mark_started(now);
    }

    /// Evaluates the restart policy at `now`.
    #[must_use]
    pub fn evaluate_restart(&self, now: Instant) -> RestartDecision {
        lock(&self.restart).evaluate(now)
    }

    /// Builds a snapshot from the current counters.
    #[must_use]
    pub fn snapshot(&self) -> HealthSnapshot {
        let (restart_count, last_restart) = {
            let restart = lock(&self.restart);
            (restart.restart_count(), restart.last_restart())
        };
        let state = self.state();
        let uptime = last_restart.map_or(Duration::ZERO, |started| started.elapsed());
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        HealthSnapshot {
            status: state.health_label(),
            timestamp: timestamp.as_secs_f64(),
            uptime: uptime.as_secs_f64(),
            function_count: self.function_count(),
            restart_count,
            state,
        }
    }
}

/// Locks a mutex, recovering the data if a holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
