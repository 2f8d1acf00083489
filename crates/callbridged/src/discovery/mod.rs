//! Discovery over the build-time-linked module catalogue.
//!
//! Every [`SourceUnit`] carries a dotted identity and a registration hook.
//! The [`DiscoveryScanner`] walks an ordered list of roots, skips the entry
//! point, hidden units, and host-side units, and runs each remaining hook
//! until it succeeds. Identities already loaded or excluded are never
//! revisited, so repeated scans are no-ops; a unit that failed is retried
//! under the next root that covers it.

mod scanner;
mod unit;

pub use self::scanner::{DiscoveryReport, DiscoveryScanner};
pub use self::unit::{RegisterFn, SourceUnit, UnitKind, UnitLoadError};

pub(crate) const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");

#[cfg(test)]
mod tests;
