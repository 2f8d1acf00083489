//! Demonstration functions shipped with the worker.
//!
//! Each submodule is one [`SourceUnit`] under the `catalog` root, so the
//! default discovery roots pick them up without configuration.

pub mod example;
pub mod math;
pub mod text;

use crate::discovery::{SourceUnit, UnitLoadError};
use crate::registry::RegistryBuilder;

/// Every unit linked into the binary, in no particular order.
pub const UNITS: &[SourceUnit] = &[
    SourceUnit::package("catalog", register_package),
    SourceUnit::module("catalog.math", math::register),
    SourceUnit::module("catalog.text", text::register),
    SourceUnit::module("catalog.example", example::register),
    SourceUnit::entry_point("callbridged", register_package),
];

/// The catalogue package itself declares no functions.
fn register_package(_builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::DiscoveryScanner;

    #[test]
    fn default_roots_discover_the_whole_catalogue() {
        let mut builder = RegistryBuilder::new();
        let roots = ["catalog", "my_codes", "modules", "src", "lib", "scripts"]
            .map(String::from)
            .to_vec();
        let report = DiscoveryScanner::new(UNITS)
            .with_roots(roots)
            .scan(&mut builder);

        assert_eq!(report.loaded, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(report.function_count, 9);
        assert!(builder.lookup("add").is_some());
        assert!(builder.lookup("greet_user").is_some());
    }
}
