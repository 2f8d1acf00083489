//! Shared configuration for the callbridge worker.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! configuration file (`--config-path` or `CALLBRIDGE_CONFIG_PATH`), then
//! `CALLBRIDGE_*` environment variables, then command-line flags. Every field
//! has a default so a bare invocation yields a working stream transport.

mod defaults;
mod logging;
mod paths;
mod transport;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_BACKOFF_CAP_MS, DEFAULT_BACKOFF_UNIT_MS, DEFAULT_CALL_TIMEOUT_MS,
    DEFAULT_DISCOVERY_ROOTS, DEFAULT_EXCHANGE_DIR, DEFAULT_HEALTH_INTERVAL_SECS,
    DEFAULT_HEALTH_PATH, DEFAULT_HOST_MARKERS, DEFAULT_LOG_FILTER, DEFAULT_MAX_FRAME_BYTES,
    DEFAULT_MAX_RESTARTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RESTART_COOLDOWN_SECS,
    default_exchange_dir, default_health_path, default_log_filter, default_log_filter_string,
    default_log_format, default_transport,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use paths::{ExchangePaths, ExchangePathsError, REQUEST_FILE, RESPONSE_FILE};
pub use transport::{TransportKind, TransportKindParseError};

/// Lower bound applied to the file-exchange poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound applied to the file-exchange poll interval.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(1_000);

/// Resolved worker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CALLBRIDGE")]
#[serde(default)]
pub struct Config {
    /// Channel binding used to talk to the host.
    pub transport: TransportKind,
    /// Directory polled by the file-exchange transport.
    pub exchange_dir: Utf8PathBuf,
    /// Poll interval for the file-exchange transport, in milliseconds.
    pub poll_interval_ms: u64,
    /// Largest accepted inbound frame, in bytes.
    pub max_frame_bytes: usize,
    /// Per-call execution budget in milliseconds; zero disables it.
    pub call_timeout_ms: u64,
    /// Number of transport restarts allowed before giving up.
    pub max_restarts: u32,
    /// Minimum uptime, in seconds, a transport needs before it may restart.
    pub restart_cooldown_secs: u64,
    /// Backoff added per restart attempt, in milliseconds.
    pub backoff_unit_ms: u64,
    /// Ceiling for the restart backoff, in milliseconds.
    pub backoff_cap_ms: u64,
    /// Interval between health snapshots, in seconds.
    pub health_interval_secs: u64,
    /// Location of the health artefact.
    pub health_path: Utf8PathBuf,
    /// Comma-separated discovery roots, searched in order.
    pub discovery_roots: String,
    /// Comma-separated identity fragments marking host-side units.
    pub host_markers: String,
    /// Tracing filter expression.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            exchange_dir: default_exchange_dir(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            max_restarts: DEFAULT_MAX_RESTARTS,
            restart_cooldown_secs: DEFAULT_RESTART_COOLDOWN_SECS,
            backoff_unit_ms: DEFAULT_BACKOFF_UNIT_MS,
            backoff_cap_ms: DEFAULT_BACKOFF_CAP_MS,
            health_interval_secs: DEFAULT_HEALTH_INTERVAL_SECS,
            health_path: default_health_path(),
            discovery_roots: DEFAULT_DISCOVERY_ROOTS.to_owned(),
            host_markers: DEFAULT_HOST_MARKERS.to_owned(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Selected transport binding.
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Directory polled by the file-exchange transport.
    #[must_use]
    pub fn exchange_dir(&self) -> &Utf8Path {
        self.exchange_dir.as_path()
    }

    /// Poll interval, clamped to the supported sub-second range.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
    }

    /// Largest accepted inbound frame, in bytes.
    #[must_use]
    pub const fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    /// Per-call execution budget, when one is configured.
    #[must_use]
    pub const fn call_timeout(&self) -> Option<Duration> {
        if self.call_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.call_timeout_ms))
        }
    }

    /// Number of restarts allowed.
    #[must_use]
    pub const fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    /// Minimum transport uptime before a restart may happen.
    #[must_use]
    pub const fn restart_cooldown(&self) -> Duration {
        Duration::from_secs(self.restart_cooldown_secs)
    }

    /// Backoff added per restart attempt.
    #[must_use]
    pub const fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    /// Ceiling for the restart backoff.
    #[must_use]
    pub const fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.backoff_cap_ms)
    }

    /// Interval between health snapshots; never shorter than one second.
    #[must_use]
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }

    /// Location of the health artefact.
    #[must_use]
    pub fn health_path(&self) -> &Utf8Path {
        self.health_path.as_path()
    }

    /// Discovery roots in search order. Empty entries are dropped, except
    /// that a lone `.` selects every unit.
    #[must_use]
    pub fn discovery_roots(&self) -> Vec<String> {
        split_list(&self.discovery_roots)
            .into_iter()
            .map(|root| if root == "." { String::new() } else { root })
            .collect()
    }

    /// Identity fragments marking host-side units.
    #[must_use]
    pub fn host_markers(&self) -> Vec<String> {
        split_list(&self.host_markers)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
