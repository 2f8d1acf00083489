//! Binding of wire arguments to declared parameters.
//!
//! Binding resolves every declared parameter to exactly one value: the
//! caller's (after coercion) or the declared default. Coercion follows a
//! fixed table so the same input is always accepted or rejected the same way.

use serde_json::Value;

use super::errors::DispatchError;
use crate::codec::Params;
use crate::registry::{CallArgs, FunctionDescriptor, ParamType, ParameterDescriptor};

/// Largest magnitude at which every integral `f64` is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Binds request parameters to a function's declared parameter list.
///
/// # Errors
///
/// Returns an invalid-params class [`DispatchError`] for unknown names,
/// surplus positional values, missing required values, and values that do
/// not coerce to the declared type.
pub fn bind(descriptor: &FunctionDescriptor, params: &Params) -> Result<CallArgs, DispatchError> {
    let declared = descriptor.parameters();
    match params {
        Params::Absent => {}
        Params::Named(named) => {
            if let Some(unknown) = named
                .keys()
                .find(|key| !declared.iter().any(|param| param.name() == key.as_str()))
            {
                return Err(DispatchError::unexpected_parameter(unknown.as_str()));
            }
        }
        Params::Positional(values) => {
            if values.len() > declared.len() {
                return Err(DispatchError::TooManyArguments {
                    expected: declared.len(),
                    received: values.len(),
                });
            }
        }
    }

    let mut args = CallArgs::new();
    for (index, parameter) in declared.iter().enumerate() {
        let supplied = match params {
            Params::Absent => None,
            Params::Named(named) => named.get(parameter.name()),
            Params::Positional(values) => values.get(index),
        };
        args.insert(parameter.name(), resolve(parameter, supplied)?);
    }
    Ok(args)
}

fn resolve(
    parameter: &ParameterDescriptor,
    supplied: Option<&Value>,
) -> Result<Value, DispatchError> {
    match (supplied, parameter.default_value()) {
        (None | Some(Value::Null), Some(default)) => Ok(default.clone()),
        (Some(value), _) => coerce(parameter.name(), parameter.kind(), value),
        (None, None) => Err(DispatchError::missing_parameter(parameter.name())),
    }
}

/// Coerces a wire value to a declared type.
///
/// | declared | accepted |
/// |----------|----------|
/// | number   | number, text parsing to a finite number |
/// | integer  | integral number, text parsing to an integer |
/// | text     | text, number, boolean |
/// | boolean  | boolean, text `true`/`false`, number 0 or 1 |
/// | sequence | array |
/// | mapping  | object |
/// | any      | anything |
///
/// # Errors
///
/// Returns [`DispatchError::Coercion`] naming the parameter and the expected
/// type when the value is not accepted.
pub fn coerce(name: &str, kind: ParamType, value: &Value) -> Result<Value, DispatchError> {
    let coerced = match kind {
        ParamType::Any => Some(value.clone()),
        ParamType::Number => coerce_number(value),
        ParamType::Integer => coerce_integer(value),
        ParamType::Text => coerce_text(value),
        ParamType::Boolean => coerce_boolean(value),
        ParamType::Sequence => value.is_array().then(|| value.clone()),
        ParamType::Mapping => value.is_object().then(|| value.clone()),
    };
    coerced.ok_or_else(|| DispatchError::coercion(name, kind, json_kind(value)))
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .map(Value::from),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(number) => {
            if number.is_i64() || number.is_u64() {
                Some(value.clone())
            } else {
                number.as_f64().and_then(integral_float)
            }
        }
        Value::String(text) => text.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is integral and within the exactly representable range"
)]
fn integral_float(value: f64) -> Option<Value> {
    let exact = value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER;
    exact.then(|| Value::from(value as i64))
}

fn coerce_text(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(number) => Some(Value::String(number.to_string())),
        Value::Bool(flag) => Some(Value::String(flag.to_string())),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Some(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(Value::Bool(false))
            } else {
                None
            }
        }
        Value::Number(number) => match number.as_u64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        _ => None,
    }
}

/// Names the JSON kind of a value using the declared-type vocabulary.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
