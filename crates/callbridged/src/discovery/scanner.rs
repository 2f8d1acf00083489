//! Root-ordered scan over the module catalogue.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::DISCOVERY_TARGET;
use super::unit::{SourceUnit, UnitKind};
use crate::registry::RegistryBuilder;

/// Counters produced by one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Units whose registration ran successfully.
    pub loaded: usize,
    /// Unit encounters skipped as excluded or already processed.
    pub skipped: usize,
    /// Units whose registration failed.
    pub failed: usize,
    /// Functions in the builder once the scan finished.
    pub function_count: usize,
}

/// Why a unit is never loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exclusion {
    EntryPoint,
    Hidden,
    HostSide,
}

/// Walks the catalogue root by root and runs each unit's registration until
/// it succeeds once.
#[derive(Debug)]
pub struct DiscoveryScanner<'a> {
    units: Vec<&'a SourceUnit>,
    roots: Vec<String>,
    host_markers: Vec<String>,
    processed: BTreeSet<&'static str>,
}

impl<'a> DiscoveryScanner<'a> {
    /// Creates a scanner over `units` that covers every unit.
    #[must_use]
    pub fn new(units: &'a [SourceUnit]) -> Self {
        let mut ordered: Vec<&SourceUnit> = units.iter().collect();
        ordered.sort_by_key(|unit| unit.identity());
        Self {
            units: ordered,
            roots: vec![String::new()],
            host_markers: Vec::new(),
            processed: BTreeSet::new(),
        }
    }

    /// Sets the ordered list of roots to walk.
    #[must_use]
    pub fn with_roots(mut self, roots: Vec<String>) -> Self {
        self.roots = roots;
        self
    }

    /// Sets the identity fragments that mark host-side units.
    #[must_use]
    pub fn with_host_markers(mut self, markers: Vec<String>) -> Self {
        self.host_markers = markers
            .into_iter()
            .map(|marker| marker.to_ascii_lowercase())
            .collect();
        self
    }

    /// Identities processed so far, loaded or excluded. Failed units are
    /// retried under later roots and are not listed.
    #[cfg(test)]
    pub(crate) fn processed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.processed.iter().copied()
    }

    /// Scans every root in order, registering into `builder`.
    ///
    /// Load failures are logged and counted; they never abort the scan.
    pub fn scan(&mut self, builder: &mut RegistryBuilder) -> DiscoveryReport {
        let mut report = DiscoveryReport::default();
        let roots = self.roots.clone();
        for root in &roots {
            self.scan_root(root, builder, &mut report);
        }
        report.function_count = builder.len();

        if report.function_count == 0 {
            warn!(
                target: DISCOVERY_TARGET,
                roots = ?self.roots,
                "no functions discovered"
            );
        } else {
            info!(
                target: DISCOVERY_TARGET,
                loaded = report.loaded,
                skipped = report.skipped,
                failed = report.failed,
                functions = report.function_count,
                "discovery finished"
            );
        }
        report
    }

    fn scan_root(&mut self, root: &str, builder: &mut RegistryBuilder, report: &mut DiscoveryReport) {
        let candidates: Vec<&SourceUnit> = self
            .units
            .iter()
            .copied()
            .filter(|unit| unit.is_under(root))
            .collect();
        if candidates.is_empty() {
            debug!(target: DISCOVERY_TARGET, root, "root matches no units; ignored");
            return;
        }

        for unit in candidates {
            let identity = unit.identity();
            if self.processed.contains(identity) {
                debug!(target: DISCOVERY_TARGET, unit = identity, "already processed");
                report.skipped += 1;
                continue;
            }
            if let Some(reason) = self.exclusion(unit) {
                debug!(target: DISCOVERY_TARGET, unit = identity, ?reason, "unit excluded");
                self.processed.insert(identity);
                report.skipped += 1;
                continue;
            }
            match unit.load(builder) {
                Ok(()) => {
                    debug!(target: DISCOVERY_TARGET, unit = identity, "unit loaded");
                    self.processed.insert(identity);
                    report.loaded += 1;
                }
                Err(error) => {
                    warn!(
                        target: DISCOVERY_TARGET,
                        unit = identity,
                        error = %error,
                        "unit failed to load"
                    );
                    report.failed += 1;
                }
            }
        }
    }

    fn exclusion(&self, unit: &SourceUnit) -> Option<Exclusion> {
        if unit.kind() == UnitKind::EntryPoint {
            return Some(Exclusion::EntryPoint);
        }
        if unit.is_hidden() {
            return Some(Exclusion::Hidden);
        }
        let identity = unit.identity().to_ascii_lowercase();
        self.host_markers
            .iter()
            .any(|marker| identity.contains(marker.as_str()))
            .then_some(Exclusion::HostSide)
    }
}
