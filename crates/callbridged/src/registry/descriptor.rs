//! Static metadata describing RPC targets.
//!
//! A [`FunctionDescriptor`] declares everything the dispatcher needs to know
//! about a target: its name, category, description, ordered parameters, and
//! the callable itself. Descriptors are validated on registration to reject
//! ambiguous signatures early.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::RegistryError;
use super::target::{CallArgs, RpcTarget, TargetError};

/// Category applied when a function does not declare one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Any finite number.
    Number,
    /// A whole number that fits in 64 bits.
    Integer,
    /// UTF-8 text.
    Text,
    /// `true` or `false`.
    Boolean,
    /// An ordered list of values.
    Sequence,
    /// A string-keyed map of values.
    Mapping,
    /// No declared type; values pass through untouched.
    #[default]
    Any,
}

impl ParamType {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single declared parameter.
///
/// A parameter is required exactly when it carries no default.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    name: String,
    kind: ParamType,
    default: Option<Value>,
}

impl ParameterDescriptor {
    /// Declares a parameter the caller must supply.
    #[must_use]
    pub fn required(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// Declares a parameter that falls back to `default` when omitted.
    #[must_use]
    pub fn optional(name: impl Into<String>, kind: ParamType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            default: Some(default.into()),
        }
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared type.
    #[must_use]
    pub const fn kind(&self) -> ParamType {
        self.kind
    }

    /// Default value for optional parameters.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns `true` when the caller must supply a value.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Describes a registered RPC target.
#[derive(Clone)]
pub struct FunctionDescriptor {
    name: String,
    category: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
    returns: ParamType,
    target: Arc<dyn RpcTarget>,
}

impl FunctionDescriptor {
    /// Starts declaring a function called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder::new(name)
    }

    /// Registry key.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Free-form grouping label.
    #[must_use]
    pub fn category(&self) -> &str {
        self.category.as_str()
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Declared return shape.
    #[must_use]
    pub const fn returns(&self) -> ParamType {
        self.returns
    }

    /// Shared handle to the callable.
    #[must_use]
    pub fn target(&self) -> Arc<dyn RpcTarget> {
        Arc::clone(&self.target)
    }

    /// Runs the target with already-bound arguments.
    ///
    /// # Errors
    ///
    /// Propagates the target's [`TargetError`].
    pub fn invoke(&self, args: &CallArgs) -> Result<Value, TargetError> {
        self.target.call(args)
    }

    /// Checks that the signature is unambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Malformed`] if the name is blank, a parameter
    /// name is blank or repeated, or a required parameter follows an optional
    /// one.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::malformed(
                &self.name,
                "function name must not be empty",
            ));
        }
        let mut seen = HashSet::new();
        let mut optional_seen = false;
        for parameter in &self.parameters {
            if parameter.name().trim().is_empty() {
                return Err(RegistryError::malformed(
                    &self.name,
                    "parameter names must not be empty",
                ));
            }
            if !seen.insert(parameter.name()) {
                return Err(RegistryError::malformed(
                    &self.name,
                    format!("parameter '{}' is declared twice", parameter.name()),
                ));
            }
            if parameter.is_required() && optional_seen {
                return Err(RegistryError::malformed(
                    &self.name,
                    format!(
                        "required parameter '{}' follows an optional parameter",
                        parameter.name()
                    ),
                ));
            }
            optional_seen |= !parameter.is_required();
        }
        Ok(())
    }
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Fluent declaration of a [`FunctionDescriptor`].
///
/// ```ignore
/// let add = FunctionDescriptor::builder("add")
///     .category("math")
///     .description("Adds two numbers.")
///     .param("a", ParamType::Number)
///     .optional("b", ParamType::Number, 0)
///     .handler(|args: &CallArgs| Ok(json!(args.number("a")? + args.number("b")?)));
/// ```
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    name: String,
    category: String,
    description: String,
    parameters: Vec<ParameterDescriptor>,
    returns: ParamType,
}

impl FunctionBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: DEFAULT_CATEGORY.to_owned(),
            description: String::new(),
            parameters: Vec::new(),
            returns: ParamType::Any,
        }
    }

    /// Sets the grouping label.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the human-readable description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, kind: ParamType) -> Self {
        self.parameters.push(ParameterDescriptor::required(name, kind));
        self
    }

    /// Appends an optional parameter with its default.
    #[must_use]
    pub fn optional(
        mut self,
        name: impl Into<String>,
        kind: ParamType,
        default: impl Into<Value>,
    ) -> Self {
        self.parameters.push(ParameterDescriptor::optional(name, kind, default));
        self
    }

    /// Declares the return shape.
    #[must_use]
    pub const fn returns(mut self, kind: ParamType) -> Self {
        self.returns = kind;
        self
    }

    /// Attaches a closure or `fn` item and finishes the declaration.
    #[must_use]
    pub fn handler<F>(self, handler: F) -> FunctionDescriptor
    where
        F: Fn(&CallArgs) -> Result<Value, TargetError> + Send + Sync + 'static,
    {
        self.target(handler)
    }

    /// Attaches any [`RpcTarget`] implementation and finishes the declaration.
    #[must_use]
    pub fn target<T>(self, target: T) -> FunctionDescriptor
    where
        T: RpcTarget,
    {
        FunctionDescriptor {
            name: self.name,
            category: self.category,
            description: self.description,
            parameters: self.parameters,
            returns: self.returns,
            target: Arc::new(target),
        }
    }
}
