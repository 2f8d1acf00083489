//! Unit tests for the discovery scanner.

use std::sync::atomic::{AtomicU32, Ordering};

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::registry::{CallArgs, FunctionDescriptor, RegistryBuilder};

fn register_named(builder: &mut RegistryBuilder, name: &str) -> Result<(), UnitLoadError> {
    builder.register(FunctionDescriptor::builder(name).handler(|_args: &CallArgs| Ok(json!(null))))?;
    Ok(())
}

fn register_alpha(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    register_named(builder, "alpha")
}

fn register_beta(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    register_named(builder, "beta")
}

fn register_gamma(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    register_named(builder, "gamma")
}

fn register_nothing(_builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    Ok(())
}

fn register_broken(_builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    Err(UnitLoadError::failed("syntax error in unit"))
}

static FLAKY_ATTEMPTS: AtomicU32 = AtomicU32::new(0);

fn register_flaky(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    if FLAKY_ATTEMPTS.fetch_add(1, Ordering::SeqCst) == 0 {
        return Err(UnitLoadError::failed("dependency not ready"));
    }
    register_named(builder, "flaky")
}

fn register_malformed(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    register_named(builder, " ")
}

const UNITS: &[SourceUnit] = &[
    SourceUnit::module("scripts.beta", register_beta),
    SourceUnit::module("catalog.alpha", register_alpha),
    SourceUnit::package("catalog", register_nothing),
    SourceUnit::module("catalogue.gamma", register_gamma),
    SourceUnit::entry_point("catalog.main", register_gamma),
    SourceUnit::module("catalog._private", register_gamma),
    SourceUnit::module("catalog.flutter_glue", register_gamma),
    SourceUnit::module("build.Ephemeral.glue", register_gamma),
];

fn roots(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

fn markers() -> Vec<String> {
    roots(&["flutter", "ephemeral"])
}

// ----------------------------------------------------------------------------
// Unit identity rules
// ----------------------------------------------------------------------------

#[rstest]
#[case::exact("catalog", "catalog", true)]
#[case::child("catalog.math", "catalog", true)]
#[case::grandchild("catalog.math.extra", "catalog.math", true)]
#[case::sibling_prefix("catalogue.math", "catalog", false)]
#[case::empty_root("anything.at.all", "", true)]
fn matches_roots_segment_wise(#[case] identity: &'static str, #[case] root: &str, #[case] expected: bool) {
    let unit = SourceUnit::module(identity, register_nothing);
    assert_eq!(unit.is_under(root), expected);
}

#[rstest]
#[case::underscore("catalog._private", true)]
#[case::dunder("__init__", true)]
#[case::dot_prefixed(".hidden", true)]
#[case::visible("catalog.math", false)]
fn detects_hidden_units(#[case] identity: &'static str, #[case] expected: bool) {
    assert_eq!(SourceUnit::module(identity, register_nothing).is_hidden(), expected);
}

// ----------------------------------------------------------------------------
// Scanning
// ----------------------------------------------------------------------------

#[test]
fn loads_units_under_each_root_and_excludes_the_rest() {
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(UNITS)
        .with_roots(roots(&["catalog", "scripts", "missing"]))
        .with_host_markers(markers());

    let report = scanner.scan(&mut builder);

    assert_eq!(report.loaded, 3, "catalog, catalog.alpha, scripts.beta");
    assert_eq!(report.skipped, 3, "entry point, private, host-side");
    assert_eq!(report.failed, 0);
    assert_eq!(report.function_count, 2);
    assert!(builder.lookup("alpha").is_some());
    assert!(builder.lookup("beta").is_some());
    assert!(builder.lookup("gamma").is_none());
}

#[test]
fn empty_root_covers_every_unit() {
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(UNITS)
        .with_roots(roots(&[""]))
        .with_host_markers(markers());

    let report = scanner.scan(&mut builder);

    assert_eq!(report.function_count, 3);
    assert!(builder.lookup("gamma").is_some());
}

#[test]
fn host_markers_match_case_insensitively() {
    let mut builder = RegistryBuilder::new();
    let units = [SourceUnit::module("build.Ephemeral.glue", register_gamma)];
    let mut scanner = DiscoveryScanner::new(&units).with_host_markers(markers());

    let report = scanner.scan(&mut builder);

    assert_eq!(report.loaded, 0);
    assert_eq!(report.skipped, 1);
}

#[test]
fn repeated_scans_do_not_reload_units() {
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(UNITS).with_roots(roots(&["catalog"]));

    let first = scanner.scan(&mut builder);
    let second = scanner.scan(&mut builder);

    assert!(first.loaded > 0);
    assert_eq!(second.loaded, 0);
    assert_eq!(second.function_count, first.function_count);
    assert!(scanner.processed().any(|identity| identity == "catalog.alpha"));
}

#[test]
fn overlapping_roots_load_each_unit_once() {
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(UNITS)
        .with_roots(roots(&["catalog.alpha", "catalog"]))
        .with_host_markers(markers());

    let report = scanner.scan(&mut builder);

    assert_eq!(report.loaded, 2, "catalog.alpha then the catalog package");
    assert!(report.skipped >= 1);
}

#[test]
fn failures_are_counted_without_aborting() {
    let units = [
        SourceUnit::module("a.broken", register_broken),
        SourceUnit::module("a.malformed", register_malformed),
        SourceUnit::module("a.working", register_alpha),
    ];
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(&units);

    let report = scanner.scan(&mut builder);

    assert_eq!(report.failed, 2);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.function_count, 1);
}

#[test]
fn failed_units_are_retried_under_later_roots() {
    let units = [SourceUnit::module("b.flaky", register_flaky)];
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(&units).with_roots(roots(&["b", "b.flaky"]));

    let report = scanner.scan(&mut builder);

    assert_eq!(report.failed, 1);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.function_count, 1);
    assert!(scanner.processed().any(|identity| identity == "b.flaky"));
}

#[test]
fn units_that_keep_failing_are_never_marked_processed() {
    let units = [SourceUnit::module("a.broken", register_broken)];
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(&units).with_roots(roots(&["a", ""]));

    let report = scanner.scan(&mut builder);

    assert_eq!(report.failed, 2);
    assert_eq!(scanner.processed().count(), 0);
}

#[test]
fn zero_functions_is_not_fatal() {
    let mut builder = RegistryBuilder::new();
    let mut scanner = DiscoveryScanner::new(UNITS).with_roots(roots(&["nowhere"]));

    let report = scanner.scan(&mut builder);

    assert_eq!(report, DiscoveryReport::default());
}
