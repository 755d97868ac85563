//! Typed planner results and their response schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of the next-action planning phase: chosen action ids in the
/// order they should execute, possibly empty.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedActions {
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Result of the parameter planning phase for one action.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedParameters {
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Result of the response formatting phase.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlannedResponse {
    pub response: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Response schema for a Rust type, as a plain JSON value.
pub fn schema_of<T: JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}

/// The [`PlannedParameters`] schema with the action's own parameter schema
/// embedded, so a schema-constrained provider generates conformant
/// parameters directly instead of free-form JSON.
pub fn parameters_schema(action_schema: &Value) -> Value {
    let mut schema = schema_of::<PlannedParameters>();
    if let Some(properties) = schema
        .get_mut("properties")
        .and_then(|p| p.as_object_mut())
    {
        properties.insert("parameters".to_string(), action_schema.clone());
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_planned_actions_schema_has_actions_field() {
        let schema = schema_of::<PlannedActions>();
        assert!(schema["properties"]["actions"].is_object());
    }

    #[test]
    fn test_parameters_schema_embeds_action_schema() {
        let action_schema = json!({
            "type": "object",
            "properties": {"a": {"type": "number"}},
            "required": ["a"]
        });
        let schema = parameters_schema(&action_schema);
        assert_eq!(schema["properties"]["parameters"], action_schema);
    }

    #[test]
    fn test_planned_actions_decodes_without_reasoning() {
        let planned: PlannedActions = serde_json::from_value(json!({"actions": ["sum"]})).unwrap();
        assert_eq!(planned.actions, ["sum"]);
        assert!(planned.reasoning.is_none());
    }
}
