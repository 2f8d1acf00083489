//! Arithmetic demonstration functions.

use std::f64::consts::PI;

use serde_json::{Number, Value, json};

use crate::discovery::UnitLoadError;
use crate::registry::{CallArgs, FunctionDescriptor, ParamType, RegistryBuilder, TargetError};

const CATEGORY: &str = "math";

/// Registers the math unit.
///
/// # Errors
///
/// Returns [`UnitLoadError`] if a descriptor is rejected.
pub fn register(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    builder.register(
        FunctionDescriptor::builder("add")
            .category(CATEGORY)
            .description("Add two numbers.")
            .param("a", ParamType::Number)
            .optional("b", ParamType::Number, 0)
            .returns(ParamType::Number)
            .handler(add),
    )?;
    builder.register(
        FunctionDescriptor::builder("power_calculation")
            .category(CATEGORY)
            .description("Calculate base raised to the power of exponent.")
            .param("base", ParamType::Number)
            .optional("exponent", ParamType::Number, 2.0)
            .returns(ParamType::Number)
            .handler(power_calculation),
    )?;
    builder.register(
        FunctionDescriptor::builder("factorial")
            .category(CATEGORY)
            .description("Calculate factorial of a number.")
            .param("n", ParamType::Integer)
            .returns(ParamType::Integer)
            .handler(factorial),
    )?;
    builder.register(
        FunctionDescriptor::builder("calculate_circle_area")
            .category(CATEGORY)
            .description("Calculate circle area and circumference given radius.")
            .param("radius", ParamType::Number)
            .returns(ParamType::Mapping)
            .handler(calculate_circle_area),
    )?;
    Ok(())
}

/// Integer operands stay integers unless the sum overflows.
fn add(args: &CallArgs) -> Result<Value, TargetError> {
    let a = args.numeric("a")?;
    let b = args.numeric("b")?;
    a.as_i64()
        .zip(b.as_i64())
        .and_then(|(x, y)| x.checked_add(y))
        .map_or_else(|| float_sum(a, b), |sum| Ok(Value::from(sum)))
}

#[expect(clippy::float_arithmetic, reason = "the function is arithmetic")]
fn float_sum(a: &Number, b: &Number) -> Result<Value, TargetError> {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => finite(x + y),
        _ => Err(TargetError::failed("operands are not representable as numbers")),
    }
}

fn power_calculation(args: &CallArgs) -> Result<Value, TargetError> {
    let result = args.number("base")?.powf(args.number("exponent")?);
    finite(result)
}

fn factorial(args: &CallArgs) -> Result<Value, TargetError> {
    let n = args.integer("n")?;
    if n < 0 {
        return Err(TargetError::failed(
            "Factorial is not defined for negative numbers",
        ));
    }
    (2..=n)
        .try_fold(1_i64, i64::checked_mul)
        .map(Value::from)
        .ok_or_else(|| TargetError::failed(format!("factorial({n}) overflows a 64-bit integer")))
}

#[expect(clippy::float_arithmetic, reason = "the function is arithmetic")]
fn calculate_circle_area(args: &CallArgs) -> Result<Value, TargetError> {
    let radius = args.number("radius")?;
    Ok(json!({
        "area": PI * radius * radius,
        "circumference": 2.0 * PI * radius,
        "radius": radius,
    }))
}

fn finite(value: f64) -> Result<Value, TargetError> {
    if value.is_finite() {
        Ok(json!(value))
    } else {
        Err(TargetError::failed("result is not a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn args(pairs: &[(&str, Value)]) -> CallArgs {
        let mut args = CallArgs::new();
        for (name, value) in pairs {
            args.insert(*name, value.clone());
        }
        args
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(5, 120)]
    #[case(20, 2_432_902_008_176_640_000)]
    fn factorial_of_small_numbers(#[case] n: i64, #[case] expected: i64) {
        let value = factorial(&args(&[("n", json!(n))])).expect("factorial");
        assert_eq!(value, json!(expected));
    }

    #[rstest]
    #[case::negative(-1, "negative")]
    #[case::overflow(21, "overflows")]
    fn factorial_rejects_out_of_range(#[case] n: i64, #[case] needle: &str) {
        let error = factorial(&args(&[("n", json!(n))])).expect_err("must fail");
        assert!(error.to_string().contains(needle));
    }

    #[rstest]
    #[case::integers(json!(2), json!(0), json!(2))]
    #[case::mixed(json!(2), json!(0.5), json!(2.5))]
    #[case::floats(json!(1.5), json!(1.5), json!(3.0))]
    #[case::overflow_widens(json!(i64::MAX), json!(1), json!(9_223_372_036_854_775_808.0))]
    fn add_keeps_integers_whole(#[case] a: Value, #[case] b: Value, #[case] expected: Value) {
        let value = add(&args(&[("a", a), ("b", b)])).expect("add");
        assert_eq!(value, expected);
    }

    #[test]
    fn power_defaults_are_applied_by_the_caller() {
        let value = power_calculation(&args(&[("base", json!(3.0)), ("exponent", json!(2.0))]))
            .expect("power");
        assert_eq!(value.as_f64(), Some(9.0));
    }

    #[test]
    fn power_rejects_non_finite_results() {
        let error = power_calculation(&args(&[("base", json!(10.0)), ("exponent", json!(400.0))]))
            .expect_err("overflow");
        assert!(error.to_string().contains("finite"));
    }

    #[test]
    fn circle_area_reports_all_measures() {
        let value = calculate_circle_area(&args(&[("radius", json!(1.0))])).expect("area");
        assert_eq!(value["radius"], json!(1.0));
        let area = value["area"].as_f64().expect("area is a number");
        assert!((area - PI).abs() < 1e-12);
    }

    #[test]
    fn registers_every_function() {
        let mut builder = RegistryBuilder::new();
        register(&mut builder).expect("register math");
        let registry = builder.seal();
        assert_eq!(
            registry.list().iter().map(|d| d.name()).collect::<Vec<_>>(),
            vec!["add", "calculate_circle_area", "factorial", "power_calculation"]
        );
    }
}
