//! Schema checks: function definitions before registration, call arguments
//! before local execution.

use std::sync::OnceLock;

use regex::Regex;

use super::types::FunctionDefinition;
use crate::error::FoundryError;

const JSON_SCHEMA_TYPES: [&str; 7] = [
    "string", "number", "integer", "boolean", "object", "array", "null",
];

fn function_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid function name pattern"))
}

/// Reject definitions the service would refuse or the model could not call.
pub fn validate_function_definition(definition: &FunctionDefinition) -> Result<(), FoundryError> {
    let name = &definition.name;
    if !function_name_pattern().is_match(name) {
        return Err(FoundryError::Validation(format!(
            "function name '{name}' must be 1-64 characters of letters, digits, '_' or '-'"
        )));
    }

    let schema = definition.parameters.as_object().ok_or_else(|| {
        FoundryError::Validation(format!("function '{name}': parameters must be a JSON object"))
    })?;

    match schema.get("type").and_then(|v| v.as_str()) {
        Some("object") => {}
        Some(other) => {
            return Err(FoundryError::Validation(format!(
                "function '{name}': parameters type must be 'object', got '{other}'"
            )))
        }
        None => {
            return Err(FoundryError::Validation(format!(
                "function '{name}': parameters schema is missing \"type\": \"object\""
            )))
        }
    }

    let empty = serde_json::Map::new();
    let properties = match schema.get("properties") {
        None => &empty,
        Some(value) => value.as_object().ok_or_else(|| {
            FoundryError::Validation(format!("function '{name}': properties must be an object"))
        })?,
    };

    for (prop, prop_schema) in properties {
        let prop_schema = prop_schema.as_object().ok_or_else(|| {
            FoundryError::Validation(format!(
                "function '{name}': property '{prop}' must be a schema object"
            ))
        })?;
        if let Some(kind) = prop_schema.get("type").and_then(|v| v.as_str()) {
            if !JSON_SCHEMA_TYPES.contains(&kind) {
                return Err(FoundryError::Validation(format!(
                    "function '{name}': property '{prop}' has unknown type '{kind}'"
                )));
            }
        }
    }

    if let Some(required) = schema.get("required") {
        let required = required.as_array().ok_or_else(|| {
            FoundryError::Validation(format!("function '{name}': required must be an array"))
        })?;
        for field in required {
            let field = field.as_str().ok_or_else(|| {
                FoundryError::Validation(format!(
                    "function '{name}': required entries must be strings"
                ))
            })?;
            if !properties.contains_key(field) {
                return Err(FoundryError::Validation(format!(
                    "function '{name}': required field '{field}' is not a declared property"
                )));
            }
        }
    }

    Ok(())
}

/// Check call arguments against a parameter schema (top level only).
///
/// Returns a message describing the first violation found.
pub fn validate_arguments(
    args: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), String> {
    if schema.get("type").and_then(|v| v.as_str()) == Some("object") && !args.is_object() {
        return Err(format!("expected object arguments, got {}", json_type_name(args)));
    }

    let Some(obj) = args.as_object() else {
        return Ok(());
    };

    if let Some(required) = schema.get("required").and_then(|v| v.as_array()) {
        if let Some(missing) = required
            .iter()
            .filter_map(|field| field.as_str())
            .find(|field| !obj.contains_key(*field))
        {
            return Err(format!("missing required field '{missing}'"));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) {
        for (key, value) in obj {
            let expected = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(|t| t.as_str());
            if let Some(expected) = expected {
                if !value_matches_type(value, expected) {
                    return Err(format!(
                        "field '{key}' expected type '{expected}', got {}",
                        json_type_name(value)
                    ));
                }
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
