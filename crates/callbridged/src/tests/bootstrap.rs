//! Bootstrap sequencing against injected loaders.

use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use super::support::{FailingConfigLoader, HealthEvent, RecordingHealthReporter, config_in};
use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_with};

#[rstest]
fn successful_bootstrap_prepares_the_health_directory() {
    let dir = TempDir::new().expect("temp dir");
    let config = config_in(&dir);
    let reporter = Arc::new(RecordingHealthReporter::default());

    let worker = bootstrap_with(&StaticConfigLoader::new(config.clone()), reporter.clone())
        .expect("bootstrap should succeed");

    assert_eq!(worker.config(), &config);
    assert!(dir.path().join("status").is_dir());
    assert!(
        !dir.path().join("exchange").exists(),
        "exchange directory is left to the file transport"
    );
    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[rstest]
fn configuration_failures_are_reported() {
    let reporter = Arc::new(RecordingHealthReporter::default());

    let Err(error) = bootstrap_with(&FailingConfigLoader, reporter.clone()) else {
        panic!("bootstrap should fail");
    };

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert_eq!(events.first(), Some(&HealthEvent::BootstrapStarting));
    assert!(matches!(
        events.last(),
        Some(HealthEvent::BootstrapFailed(message)) if message.contains("configuration")
    ));
}

#[rstest]
fn unwritable_health_directory_fails_bootstrap() {
    let dir = TempDir::new().expect("temp dir");
    let blocker = dir.path().join("status");
    std::fs::write(&blocker, b"not a directory").expect("write blocker");
    let config = config_in(&dir);
    let reporter = Arc::new(RecordingHealthReporter::default());

    let Err(error) = bootstrap_with(&StaticConfigLoader::new(config), reporter.clone()) else {
        panic!("bootstrap should fail");
    };

    assert!(matches!(error, BootstrapError::Paths { .. }));
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::BootstrapFailed(_))
    ));
}
