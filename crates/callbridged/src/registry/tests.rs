//! Unit tests for the function registry.

use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;

fn constant(name: &str, value: i64) -> FunctionDescriptor {
    FunctionDescriptor::builder(name)
        .category("test")
        .description(format!("returns {value}"))
        .handler(move |_args: &CallArgs| Ok(json!(value)))
}

fn add() -> FunctionDescriptor {
    FunctionDescriptor::builder("add")
        .category("math")
        .description("Adds two numbers.")
        .param("a", ParamType::Number)
        .optional("b", ParamType::Number, 0)
        .handler(|args: &CallArgs| Ok(json!(args.number("a")? + args.number("b")?)))
}

#[fixture]
fn populated() -> RegistryBuilder {
    let mut builder = RegistryBuilder::new();
    builder.register(constant("zeta", 1)).expect("register zeta");
    builder.register(add()).expect("register add");
    builder.register(constant("mid", 2)).expect("register mid");
    builder
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn new_builder_is_empty() {
    let builder = RegistryBuilder::new();
    assert!(builder.is_empty());
    assert_eq!(builder.len(), 0);
}

#[test]
fn register_reports_insert_then_replace() {
    let mut builder = RegistryBuilder::new();
    assert_eq!(
        builder.register(constant("answer", 41)).expect("first"),
        Registration::Inserted
    );
    assert_eq!(
        builder.register(constant("answer", 42)).expect("second"),
        Registration::Replaced
    );
    assert_eq!(builder.len(), 1);

    let registry = builder.seal();
    let descriptor = registry.lookup("answer").expect("lookup");
    let result = descriptor.invoke(&CallArgs::new()).expect("invoke");
    assert_eq!(result, json!(42));
}

#[rstest]
#[case::blank_name(FunctionDescriptor::builder("  ").handler(|_: &CallArgs| Ok(Value::Null)))]
#[case::duplicate_parameter(
    FunctionDescriptor::builder("dup")
        .param("x", ParamType::Number)
        .param("x", ParamType::Text)
        .handler(|_: &CallArgs| Ok(Value::Null))
)]
#[case::required_after_optional(
    FunctionDescriptor::builder("order")
        .optional("x", ParamType::Number, 1)
        .param("y", ParamType::Number)
        .handler(|_: &CallArgs| Ok(Value::Null))
)]
fn register_rejects_malformed(#[case] descriptor: FunctionDescriptor) {
    let mut builder = RegistryBuilder::new();
    let error = builder.register(descriptor).expect_err("should reject");
    assert!(matches!(error, RegistryError::Malformed { .. }));
    assert!(builder.is_empty());
}

// ---------------------------------------------------------------------------
// Lookup and listing
// ---------------------------------------------------------------------------

#[rstest]
fn list_is_sorted_and_complete(populated: RegistryBuilder) {
    let registry = populated.seal();
    let names = registry
        .list()
        .iter()
        .map(|descriptor| descriptor.name().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["add", "mid", "zeta"]);
    assert_eq!(registry.len(), 3);
}

#[rstest]
fn lookup_missing_returns_none(populated: RegistryBuilder) {
    assert!(populated.lookup("missing").is_none());
    assert!(populated.seal().lookup("missing").is_none());
}

#[rstest]
fn sealed_clones_share_contents(populated: RegistryBuilder) {
    let registry = populated.seal();
    let clone = registry.clone();
    assert_eq!(clone.len(), registry.len());
    assert!(clone.lookup("add").is_some());
}

#[rstest]
fn describe_lists_every_function_once(populated: RegistryBuilder) {
    let description = populated.seal().describe();
    let object = description.as_object().expect("object");
    assert_eq!(object.len(), 3);
    assert_eq!(
        description["add"],
        json!({
            "category": "math",
            "description": "Adds two numbers.",
            "parameters": [
                {"name": "a", "type": "number", "required": true},
                {"name": "b", "type": "number", "required": false, "default": 0},
            ],
            "returns": "any",
        })
    );
}

#[test]
fn default_category_applies() {
    let descriptor = FunctionDescriptor::builder("plain").handler(|_: &CallArgs| Ok(Value::Null));
    assert_eq!(descriptor.category(), DEFAULT_CATEGORY);
}
