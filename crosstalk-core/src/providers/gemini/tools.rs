//! Tool declaration normalization for Gemini
//!
//! Gemini accepts an OpenAPI subset for function parameters. Canonical
//! declarations carry JSON schema under `input_schema`; this module renames
//! that to `parameters` and strips the keywords Gemini rejects.

use super::types::{FunctionDeclaration, GeminiTool};
use crate::protocol::ToolDeclaration;
use serde_json::{Map, Value};

/// String formats Gemini accepts
const SUPPORTED_STRING_FORMATS: [&str; 2] = ["enum", "date-time"];

/// Keywords Gemini's schema language does not support
const UNSUPPORTED_KEYS: [&str; 2] = ["additional_properties", "additionalProperties"];

/// Convert canonical tool declarations into Gemini tools
///
/// Returns `None` for an empty list so the request omits `tools` entirely.
pub fn to_gemini_tools(declarations: &[ToolDeclaration]) -> Option<Vec<GeminiTool>> {
    if declarations.is_empty() {
        return None;
    }

    Some(vec![GeminiTool {
        function_declarations: declarations.iter().map(to_function_declaration).collect(),
    }])
}

/// Convert one canonical declaration
pub fn to_function_declaration(declaration: &ToolDeclaration) -> FunctionDeclaration {
    FunctionDeclaration {
        name: declaration.name.clone(),
        description: declaration.description.clone(),
        parameters: Some(clean_schema(&declaration.input_schema)),
    }
}

/// Recursively strip schema keywords Gemini rejects
pub fn clean_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let is_string = map.get("type").and_then(Value::as_str) == Some("string");
            let mut cleaned = Map::with_capacity(map.len());

            for (key, value) in map {
                if UNSUPPORTED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if key == "format" && is_string && !is_supported_format(value) {
                    continue;
                }
                cleaned.insert(key.clone(), clean_schema(value));
            }

            Value::Object(cleaned)
        }
        Value::Array(items) => Value::Array(items.iter().map(clean_schema).collect()),
        leaf => leaf.clone(),
    }
}

fn is_supported_format(format: &Value) -> bool {
    format
        .as_str()
        .is_some_and(|format| SUPPORTED_STRING_FORMATS.contains(&format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_free_form_string_format_dropped() {
        let cleaned = clean_schema(&json!({
            "type": "string",
            "format": "email",
            "additional_properties": {"type": "string"}
        }));
        assert_eq!(cleaned, json!({"type": "string"}));
    }

    #[test]
    fn test_supported_formats_kept() {
        for format in ["enum", "date-time"] {
            let schema = json!({"type": "string", "format": format});
            assert_eq!(clean_schema(&schema), schema);
        }
    }

    #[test]
    fn test_format_on_non_string_kept() {
        let schema = json!({"type": "integer", "format": "int64"});
        assert_eq!(clean_schema(&schema), schema);
    }

    #[test]
    fn test_empty_declarations_omit_tools() {
        assert!(to_gemini_tools(&[]).is_none());
    }

    #[test]
    fn test_input_schema_becomes_parameters() {
        let declaration = ToolDeclaration::new(
            "get_order",
            "Look up an order",
            json!({"type": "object", "properties": {"order_id": {"type": "string"}}, "required": ["order_id"]}),
        );

        let tools = to_gemini_tools(std::slice::from_ref(&declaration)).unwrap();
        assert_eq!(
            serde_json::to_value(&tools).unwrap(),
            json!([{
                "functionDeclarations": [{
                    "name": "get_order",
                    "description": "Look up an order",
                    "parameters": {
                        "type": "object",
                        "properties": {"order_id": {"type": "string"}},
                        "required": ["order_id"]
                    }
                }]
            }])
        );
    }
}
