//! Invocation surface shared by every registered function.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A callable exposed to the host.
///
/// Implemented for any `Fn(&CallArgs) -> Result<Value, TargetError>` closure,
/// so most functions are registered as plain closures or `fn` items.
pub trait RpcTarget: Send + Sync + 'static {
    /// Executes the target with arguments already bound and coerced to the
    /// declared parameter types.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when the function rejects its inputs or fails
    /// while running; the dispatcher reports it as an internal error.
    fn call(&self, args: &CallArgs) -> Result<Value, TargetError>;
}

impl<F> RpcTarget for F
where
    F: Fn(&CallArgs) -> Result<Value, TargetError> + Send + Sync + 'static,
{
    fn call(&self, args: &CallArgs) -> Result<Value, TargetError> {
        self(args)
    }
}

/// Failure raised by a target while executing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The target reported a domain failure.
    #[error("{message}")]
    Failed {
        /// Message surfaced to the caller.
        message: String,
    },
    /// The target read an argument with a type it was not declared with.
    #[error("argument '{name}' is not available as {expected}")]
    Argument {
        /// Parameter name.
        name: String,
        /// Expected representation.
        expected: &'static str,
    },
}

impl TargetError {
    /// Creates a domain failure with the given message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    fn argument(name: &str, expected: &'static str) -> Self {
        Self::Argument {
            name: name.to_owned(),
            expected,
        }
    }
}

/// Arguments bound to a target's declared parameters.
///
/// Every declared parameter is present: either the caller's (coerced) value
/// or the declared default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a bound value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Returns the raw bound value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a numeric argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not a number.
    pub fn number(&self, name: &str) -> Result<f64, TargetError> {
        self.get(name)
            .and_then(Value::as_f64)
            .ok_or_else(|| TargetError::argument(name, "a number"))
    }

    /// Reads a numeric argument without losing whether it was an integer.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not a number.
    pub fn numeric(&self, name: &str) -> Result<&Number, TargetError> {
        match self.get(name) {
            Some(Value::Number(number)) => Ok(number),
            _ => Err(TargetError::argument(name, "a number")),
        }
    }

    /// Reads an integer argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not an integer.
    pub fn integer(&self, name: &str) -> Result<i64, TargetError> {
        self.get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| TargetError::argument(name, "an integer"))
    }

    /// Reads a text argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not text.
    pub fn text(&self, name: &str) -> Result<&str, TargetError> {
        self.get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| TargetError::argument(name, "text"))
    }

    /// Reads a boolean argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, TargetError> {
        self.get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| TargetError::argument(name, "a boolean"))
    }

    /// Reads a sequence argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not a sequence.
    pub fn sequence(&self, name: &str) -> Result<&[Value], TargetError> {
        self.get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| TargetError::argument(name, "a sequence"))
    }

    /// Reads a mapping argument.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Argument`] if the value is missing or not a mapping.
    pub fn mapping(&self, name: &str) -> Result<&Map<String, Value>, TargetError> {
        self.get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| TargetError::argument(name, "a mapping"))
    }
}
