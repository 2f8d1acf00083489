//! Function registry for descriptor storage and lookup.
//!
//! Registration happens in two phases. During discovery a [`RegistryBuilder`]
//! collects descriptors; registering an existing name replaces the previous
//! descriptor and reports [`Registration::Replaced`] so the overwrite is never
//! silent. [`RegistryBuilder::seal`] then freezes the map into a [`Registry`],
//! a cheaply clonable read-only view shared by the dispatcher and the health
//! timer.

mod descriptor;
mod errors;
mod target;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

pub use self::descriptor::{
    DEFAULT_CATEGORY, FunctionBuilder, FunctionDescriptor, ParamType, ParameterDescriptor,
};
pub use self::errors::RegistryError;
pub use self::target::{CallArgs, RpcTarget, TargetError};

pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The name was not registered before.
    Inserted,
    /// An existing descriptor with the same name was overwritten.
    Replaced,
}

/// Mutable registry used while discovery is running.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    functions: BTreeMap<String, Arc<FunctionDescriptor>>,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor after validation. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Malformed`] if the descriptor fails validation.
    pub fn register(
        &mut self,
        descriptor: FunctionDescriptor,
    ) -> Result<Registration, RegistryError> {
        descriptor.validate()?;
        let name = descriptor.name().to_owned();
        let previous = self.functions.insert(name.clone(), Arc::new(descriptor));
        if previous.is_some() {
            warn!(
                target: REGISTRY_TARGET,
                function = %name,
                "function re-registered; previous descriptor replaced"
            );
            Ok(Registration::Replaced)
        } else {
            debug!(target: REGISTRY_TARGET, function = %name, "function registered");
            Ok(Registration::Inserted)
        }
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name).map(Arc::as_ref)
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Freezes the builder into a read-only registry.
    #[must_use]
    pub fn seal(self) -> Registry {
        Registry {
            functions: Arc::new(self.functions),
        }
    }
}

/// Read-only registry shared after discovery.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: Arc<BTreeMap<String, Arc<FunctionDescriptor>>>,
}

impl Registry {
    /// Looks up a descriptor by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<FunctionDescriptor>> {
        self.functions.get(name).cloned()
    }

    /// Snapshot of every descriptor, ordered by name.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<FunctionDescriptor>> {
        self.functions.values().cloned().collect()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Introspection payload returned by the `list_functions` meta-method.
    ///
    /// Shape: `{name: {category, description, parameters: [{name, type,
    /// required, default?}]}}`.
    #[must_use]
    pub fn describe(&self) -> Value {
        let entries = self
            .functions
            .iter()
            .map(|(name, descriptor)| (name.clone(), describe_function(descriptor)))
            .collect::<Map<String, Value>>();
        Value::Object(entries)
    }
}

fn describe_function(descriptor: &FunctionDescriptor) -> Value {
    let parameters = descriptor
        .parameters()
        .iter()
        .map(|parameter| {
            let mut entry = json!({
                "name": parameter.name(),
                "type": parameter.kind().as_str(),
                "required": parameter.is_required(),
            });
            if let (Some(default), Some(object)) =
                (parameter.default_value(), entry.as_object_mut())
            {
                object.insert("default".to_owned(), default.clone());
            }
            entry
        })
        .collect::<Vec<_>>();
    json!({
        "category": descriptor.category(),
        "description": descriptor.description(),
        "parameters": parameters,
        "returns": descriptor.returns().as_str(),
    })
}

#[cfg(test)]
mod tests;
