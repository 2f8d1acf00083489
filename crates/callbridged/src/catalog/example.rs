//! Everyday demonstration functions.

use serde_json::{Value, json};

use crate::discovery::UnitLoadError;
use crate::registry::{CallArgs, FunctionDescriptor, ParamType, RegistryBuilder, TargetError};

const CATEGORY: &str = "example";
const COST_PER_ITEM: f64 = 5.0;

/// Registers the example unit.
///
/// # Errors
///
/// Returns [`UnitLoadError`] if a descriptor is rejected.
pub fn register(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    builder.register(
        FunctionDescriptor::builder("greet_user")
            .category(CATEGORY)
            .description("Greet a user with optional title.")
            .param("name", ParamType::Text)
            .optional("title", ParamType::Text, "User")
            .returns(ParamType::Text)
            .handler(greet_user),
    )?;
    builder.register(
        FunctionDescriptor::builder("calculate_bmi")
            .category(CATEGORY)
            .description("Calculate BMI and return with category.")
            .param("weight", ParamType::Number)
            .param("height", ParamType::Number)
            .returns(ParamType::Mapping)
            .handler(calculate_bmi),
    )?;
    builder.register(
        FunctionDescriptor::builder("process_shopping_list")
            .category(CATEGORY)
            .description("Process a shopping list with budget analysis.")
            .param("items", ParamType::Sequence)
            .optional("budget", ParamType::Number, 100.0)
            .returns(ParamType::Mapping)
            .handler(process_shopping_list),
    )?;
    Ok(())
}

fn greet_user(args: &CallArgs) -> Result<Value, TargetError> {
    let name = args.text("name")?;
    let title = args.text("title")?;
    Ok(json!(format!("Hello, {title} {name}! Welcome to callbridge!")))
}

#[expect(clippy::float_arithmetic, reason = "the function is arithmetic")]
fn calculate_bmi(args: &CallArgs) -> Result<Value, TargetError> {
    let weight = args.number("weight")?;
    let height = args.number("height")?;
    if height <= 0.0 {
        return Err(TargetError::failed("height must be positive"));
    }
    let bmi = weight / (height * height);
    let category = match bmi {
        value if value < 18.5 => "Underweight",
        value if value < 25.0 => "Normal weight",
        value if value < 30.0 => "Overweight",
        _ => "Obese",
    };
    Ok(json!({
        "bmi": (bmi * 100.0).round() / 100.0,
        "category": category,
        "weight": weight,
        "height": height,
    }))
}

#[expect(clippy::float_arithmetic, reason = "the function is arithmetic")]
fn process_shopping_list(args: &CallArgs) -> Result<Value, TargetError> {
    let items = args.sequence("items")?;
    let budget = args.number("budget")?;
    let count = u32::try_from(items.len())
        .map_err(|_| TargetError::failed("too many items"))?;
    let estimated_cost = f64::from(count) * COST_PER_ITEM;
    Ok(json!({
        "total_items": count,
        "items": items,
        "estimated_cost": estimated_cost,
        "budget": budget,
        "within_budget": estimated_cost <= budget,
        "remaining_budget": (budget - estimated_cost).max(0.0),
    }))
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

    #[test]
    fn greets_with_title() {
        let value = greet_user(&args(&[("name", json!("Ada")), ("title", json!("Dr"))]))
            .expect("greet");
        assert_eq!(value, json!("Hello, Dr Ada! Welcome to callbridge!"));
    }

    #[rstest]
    #[case(50.0, 1.8, "Underweight")]
    #[case(70.0, 1.8, "Normal weight")]
    #[case(90.0, 1.8, "Overweight")]
    #[case(120.0, 1.8, "Obese")]
    fn classifies_bmi(#[case] weight: f64, #[case] height: f64, #[case] expected: &str) {
        let value = calculate_bmi(&args(&[("weight", json!(weight)), ("height", json!(height))]))
            .expect("bmi");
        assert_eq!(value["category"], json!(expected));
    }

    #[test]
    fn rounds_bmi_to_two_places() {
        let value = calculate_bmi(&args(&[("weight", json!(70.0)), ("height", json!(1.75))]))
            .expect("bmi");
        assert_eq!(value["bmi"], json!(22.86));
    }

    #[test]
    fn rejects_zero_height() {
        let error = calculate_bmi(&args(&[("weight", json!(70.0)), ("height", json!(0.0))]))
            .expect_err("zero height");
        assert!(error.to_string().contains("height"));
    }

    #[test]
    fn shopping_list_tracks_budget() {
        let value = process_shopping_list(&args(&[
            ("items", json!(["milk", "eggs", "bread"])),
            ("budget", json!(10.0)),
        ]))
        .expect("shopping list");
        assert_eq!(value["total_items"], json!(3));
        assert_eq!(value["estimated_cost"], json!(15.0));
        assert_eq!(value["within_budget"], json!(false));
        assert_eq!(value["remaining_budget"], json!(0.0));
    }
}
