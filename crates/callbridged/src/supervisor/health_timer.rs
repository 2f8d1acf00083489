//! Background thread publishing periodic health snapshots.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::stats::{HealthSnapshot, SupervisorStats};
use crate::files::atomic_write;
use crate::health::HEALTH_TARGET;

/// Writes one snapshot atomically to `path`.
///
/// # Errors
///
/// Returns an IO error if serialisation or the atomic write fails.
pub fn write_snapshot(path: &Path, snapshot: &HealthSnapshot) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(snapshot).map_err(io::Error::other)?;
    atomic_write(path, &bytes)
}

/// Handle to the running health timer.
#[derive(Debug)]
pub struct HealthTimer {
    stats: Arc<SupervisorStats>,
    handle: Option<JoinHandle<()>>,
}

impl HealthTimer {
    /// Spawns the timer thread. It writes a snapshot immediately and then
    /// every `interval` until the shutdown flag in `stats` is raised.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the thread cannot be spawned.
    pub fn spawn(
        stats: Arc<SupervisorStats>,
        path: PathBuf,
        interval: Duration,
    ) -> io::Result<Self> {
        let shared = Arc::clone(&stats);
        let handle = thread::Builder::new()
            .name(String::from("health-timer"))
            .spawn(move || run(&shared, &path, interval))?;
        Ok(Self {
            stats,
            handle: Some(handle),
        })
    }

    /// Raises the shutdown flag and waits for the timer thread to exit.
    pub fn stop(mut self) {
        self.stats.shutdown().raise();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!(target: HEALTH_TARGET, "health timer thread panicked");
        }
    }
}

fn run(stats: &SupervisorStats, path: &Path, interval: Duration) {
    debug!(
        target: HEALTH_TARGET,
        path = %path.display(),
        interval_secs = interval.as_secs(),
        "health timer started"
    );
    publish(stats, path);
    while stats.shutdown().sleep(interval) {
        publish(stats, path);
    }
    debug!(target: HEALTH_TARGET, "health timer stopped");
}

/// Writes a snapshot of `stats`, logging rather than propagating failures.
pub(crate) fn publish(stats: &SupervisorStats, path: &Path) {
    let snapshot = stats.snapshot();
    match write_snapshot(path, &snapshot) {
        Ok(()) => debug!(
            target: HEALTH_TARGET,
            state = %snapshot.state,
            functions = snapshot.function_count,
            restarts = snapshot.restart_count,
            "health snapshot written"
        ),
        Err(error) => warn!(
            target: HEALTH_TARGET,
            path = %path.display(),
            error = %error,
            "failed to write health snapshot"
        ),
    }
}
