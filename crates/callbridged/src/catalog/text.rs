//! Text demonstration functions.

use serde_json::{Value, json};

use crate::discovery::UnitLoadError;
use crate::registry::{CallArgs, FunctionDescriptor, ParamType, RegistryBuilder, TargetError};

const CATEGORY: &str = "text";

/// Registers the text unit.
///
/// # Errors
///
/// Returns [`UnitLoadError`] if a descriptor is rejected.
pub fn register(builder: &mut RegistryBuilder) -> Result<(), UnitLoadError> {
    builder.register(
        FunctionDescriptor::builder("reverse_text")
            .category(CATEGORY)
            .description("Reverse the characters of a string.")
            .param("text", ParamType::Text)
            .returns(ParamType::Text)
            .handler(reverse_text),
    )?;
    builder.register(
        FunctionDescriptor::builder("word_count")
            .category(CATEGORY)
            .description("Count words, optionally ignoring short ones.")
            .param("text", ParamType::Text)
            .optional("min_length", ParamType::Integer, 1)
            .returns(ParamType::Mapping)
            .handler(word_count),
    )?;
    Ok(())
}

fn reverse_text(args: &CallArgs) -> Result<Value, TargetError> {
    Ok(json!(args.text("text")?.chars().rev().collect::<String>()))
}

fn word_count(args: &CallArgs) -> Result<Value, TargetError> {
    let text = args.text("text")?;
    let min_length = usize::try_from(args.integer("min_length")?)
        .map_err(|_| TargetError::failed("min_length must not be negative"))?;
    let words = text
        .split_whitespace()
        .filter(|word| word.chars().count() >= min_length)
        .count();
    Ok(json!({
        "words": words,
        "characters": text.chars().count(),
    }))
}
