//! Source units: build-time-linked modules that register functions.

use std::fmt;

use thiserror::Error;

use crate::registry::{RegistryBuilder, RegistryError};

/// Registration hook run once per discovered unit.
pub type RegisterFn = fn(&mut RegistryBuilder) -> Result<(), UnitLoadError>;

/// Role of a unit within the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// A leaf module contributing functions.
    Module,
    /// A package whose own registration runs alongside its children.
    Package,
    /// The worker's own entry point; never loaded by the scanner.
    EntryPoint,
}

/// A unit in the module catalogue.
#[derive(Clone, Copy)]
pub struct SourceUnit {
    identity: &'static str,
    kind: UnitKind,
    register: RegisterFn,
}

impl SourceUnit {
    /// Declares a leaf module.
    #[must_use]
    pub const fn module(identity: &'static str, register: RegisterFn) -> Self {
        Self {
            identity,
            kind: UnitKind::Module,
            register,
        }
    }

    /// Declares a package.
    #[must_use]
    pub const fn package(identity: &'static str, register: RegisterFn) -> Self {
        Self {
            identity,
            kind: UnitKind::Package,
            register,
        }
    }

    /// Declares the entry-point unit.
    #[must_use]
    pub const fn entry_point(identity: &'static str, register: RegisterFn) -> Self {
        Self {
            identity,
            kind: UnitKind::EntryPoint,
            register,
        }
    }

    /// Canonical dotted identity, for example `catalog.math`.
    #[must_use]
    pub const fn identity(&self) -> &'static str {
        self.identity
    }

    /// Role of the unit.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Returns true when the identity sits at or below `root`.
    ///
    /// Matching is segment-wise: `catalog` covers `catalog.math` but not
    /// `catalogue`. The empty root covers every unit.
    #[must_use]
    pub fn is_under(&self, root: &str) -> bool {
        if root.is_empty() {
            return true;
        }
        self.identity
            .strip_prefix(root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }

    /// Returns true when any identity segment starts with `_` or `.`.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.identity
            .split('.')
            .any(|segment| segment.starts_with('_') || segment.is_empty())
    }

    /// Runs the unit's registration against `builder`.
    ///
    /// # Errors
    ///
    /// Propagates the [`UnitLoadError`] raised by the registration hook.
    pub fn load(&self, builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
        (self.register)(builder)
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceUnit")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Failure raised while loading a single unit.
#[derive(Debug, Error)]
pub enum UnitLoadError {
    /// A descriptor declared by the unit was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The unit failed for another reason.
    #[error("{message}")]
    Failed {
        /// Description of the failure.
        message: String,
    },
}

impl UnitLoadError {
    /// Creates a generic load failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}
