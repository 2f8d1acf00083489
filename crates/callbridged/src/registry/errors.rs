//! Errors raised while building the registry.

use thiserror::Error;

/// Errors arising from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A descriptor failed validation.
    #[error("malformed descriptor '{name}': {message}")]
    Malformed {
        /// Name of the offending function (may be empty).
        name: String,
        /// Description of the validation failure.
        message: String,
    },
}

impl RegistryError {
    /// Creates a malformed-descriptor error.
    #[must_use]
    pub fn malformed(name: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_owned(),
            message: message.into(),
        }
    }
}
