//! JSON Schema compilation and instance validation.
//!
//! Distinguishes the two failure modes the loop treats differently: a
//! schema that fails to compile is a registration-time defect (fatal),
//! while an instance that fails validation is a planner protocol error
//! (retryable).

use serde_json::Value;

/// A compiled parameter schema.
#[derive(Debug)]
pub struct CompiledSchema {
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    /// Compile an action's parameter schema. Failure here is a
    /// configuration defect and aborts the interaction.
    pub fn compile(action_id: &str, schema: &Value) -> crate::Result<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| crate::Error::SchemaCompile {
                action: action_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { validator })
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Validation error messages for an instance, empty when it conforms.
    pub fn errors(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number_pair_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "number"},
                "b": {"type": "number"}
            },
            "required": ["a", "b"]
        })
    }

    #[test]
    fn test_valid_instance_passes() {
        let schema = CompiledSchema::compile("sum", &number_pair_schema()).unwrap();
        assert!(schema.is_valid(&json!({"a": 10, "b": 5})));
        assert!(schema.errors(&json!({"a": 10, "b": 5})).is_empty());
    }

    #[test]
    fn test_invalid_instance_reports_errors() {
        let schema = CompiledSchema::compile("sum", &number_pair_schema()).unwrap();
        assert!(!schema.is_valid(&json!({"a": "ten"})));
        let errors = schema.errors(&json!({"a": "ten"}));
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_malformed_schema_is_a_compile_error() {
        let err = CompiledSchema::compile("sum", &json!({"type": 42})).unwrap_err();
        assert!(matches!(err, crate::Error::SchemaCompile { action, .. } if action == "sum"));
    }
}
