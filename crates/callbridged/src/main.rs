//! Entry point for the callbridge worker.

use std::process::ExitCode;

fn main() -> ExitCode {
    match callbridged::run_worker() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(
                target: concat!(env!("CARGO_PKG_NAME"), "::launch"),
                error = %error,
                "worker exited with an error"
            );
            report(&error);
            ExitCode::FAILURE
        }
    }
}

/// Mirrors fatal errors on stderr in case telemetry never came up.
#[expect(
    clippy::print_stderr,
    reason = "bootstrap can fail before a subscriber is installed"
)]
fn report(error: &callbridged::LaunchError) {
    if matches!(error, callbridged::LaunchError::Bootstrap { .. }) {
        eprintln!("callbridged: {error}");
    }
}
