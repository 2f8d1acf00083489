use camino::Utf8PathBuf;

use crate::logging::LogFormat;
use crate::transport::TransportKind;

/// Default log filter expression used by the worker.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default directory used by the file-exchange transport.
pub const DEFAULT_EXCHANGE_DIR: &str = "callbridge_exchange";

/// Default location of the health artefact, relative to the working directory.
pub const DEFAULT_HEALTH_PATH: &str = "callbridge_status.json";

/// Default poll interval for the file-exchange transport.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Upper bound for a single inbound frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Per-call timeout; zero disables the budget.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 0;

/// Restart budget for the transport loop.
pub const DEFAULT_MAX_RESTARTS: u32 = 10;

/// Minimum time a transport must have been running before a restart is allowed.
pub const DEFAULT_RESTART_COOLDOWN_SECS: u64 = 60;

/// Backoff added per restart attempt.
pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 2_000;

/// Ceiling for the restart backoff.
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 30_000;

/// Interval between health snapshots.
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 30;

/// Discovery roots searched, in order, when none are configured.
pub const DEFAULT_DISCOVERY_ROOTS: &str = "catalog,my_codes,modules,src,lib,scripts";

/// Identity fragments marking units that belong to the host side.
pub const DEFAULT_HOST_MARKERS: &str = "flutter,ephemeral";

/// Default log filter expression used by the worker.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the worker.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default transport binding.
#[must_use]
pub const fn default_transport() -> TransportKind {
    TransportKind::Stream
}

/// Default exchange directory for the file transport.
#[must_use]
pub fn default_exchange_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_EXCHANGE_DIR)
}

/// Default health artefact path.
#[must_use]
pub fn default_health_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_HEALTH_PATH)
}
