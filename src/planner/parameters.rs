//! Parameter planning: derive and validate one action's arguments.

use std::time::Instant;

use tracing::debug;

use super::core::{PlannerCore, PlannerOutcome, decode_content};
use super::prompts::{GET_ACTION_PARAMETERS_PROMPT, render};
use super::schema::CompiledSchema;
use super::schemas::{PlannedParameters, parameters_schema};
use crate::actions::Action;
use crate::agent::InteractionState;
use crate::completion::{CompletionProvider, CompletionRequest};

pub struct ParameterPlanner {
    core: PlannerCore,
}

impl ParameterPlanner {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            core: PlannerCore::new(instructions),
        }
    }

    pub fn core(&self) -> &PlannerCore {
        &self.core
    }

    /// Derive a concrete argument object for `action` and validate it
    /// against the action's declared schema.
    ///
    /// A schema that fails to compile is a registration-time defect and
    /// aborts the interaction ([`crate::Error::SchemaCompile`]). Output
    /// that fails validation is retryable
    /// ([`crate::Error::ParameterValidation`]); the action body never
    /// observes it either way.
    pub async fn plan(
        &self,
        provider: &dyn CompletionProvider,
        action: &Action,
        state: &InteractionState,
    ) -> crate::Result<PlannerOutcome<PlannedParameters>> {
        let action_schema = action.parameters.as_ref().ok_or_else(|| {
            crate::Error::MissingParameterSchema(action.id.clone())
        })?;
        let compiled = CompiledSchema::compile(&action.id, action_schema)?;

        let schema_text = serde_json::to_string_pretty(action_schema)
            .unwrap_or_else(|_| "{}".into());
        let additional = match &action.additional_instructions {
            Some(text) => format!("\nAdditional instructions:\n{}\n", text),
            None => String::new(),
        };
        let prompt = render(
            GET_ACTION_PARAMETERS_PROMPT,
            &[
                ("instructions", self.core.instructions()),
                ("action", &action.id),
                ("action_description", &action.description),
                ("additional_instructions", &additional),
                ("parameter_schema", &schema_text),
                ("planner_state", &self.core.format_planner_state(state)),
            ],
        );

        let start = Instant::now();
        let completion = provider
            .complete(CompletionRequest::new(
                prompt,
                parameters_schema(action_schema),
            ))
            .await?;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.core.track_cost(completion.cost_cents);

        let planned: PlannedParameters = decode_content(completion.content.clone())?;

        let errors = compiled.errors(&planned.parameters);
        if !errors.is_empty() {
            return Err(crate::Error::ParameterValidation {
                action: action.id.clone(),
                message: errors.join("; "),
            });
        }

        debug!(
            action = %action.id,
            duration_ms,
            "Planned action parameters"
        );

        Ok(PlannerOutcome::from_completion(
            planned,
            &completion,
            duration_ms,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::testing::ScriptedProvider;
    use serde_json::{Value, json};

    fn sum_action() -> Action {
        Action::builder("sum")
            .description("Adds two numbers")
            .parameters(json!({
                "type": "object",
                "properties": {
                    "a": {"type": "number"},
                    "b": {"type": "number"}
                },
                "required": ["a", "b"]
            }))
            .handler(|_, _| Ok(Value::Null))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_parameters_pass_through() {
        let planner = ParameterPlanner::new("");
        let provider = ScriptedProvider::new(vec![json!({
            "parameters": {"a": 10, "b": 5},
            "reasoning": "from the request"
        })]);
        let action = sum_action();
        let state = InteractionState::new("10 plus 5");

        let outcome = planner.plan(&provider, &action, &state).await.unwrap();
        assert_eq!(outcome.content.parameters, json!({"a": 10, "b": 5}));
    }

    #[tokio::test]
    async fn test_schema_violation_is_retryable_error() {
        let planner = ParameterPlanner::new("");
        let provider = ScriptedProvider::new(vec![json!({
            "parameters": {"a": "ten"},
            "reasoning": "oops"
        })]);
        let action = sum_action();
        let state = InteractionState::new("10 plus 5");

        let err = planner.plan(&provider, &action, &state).await.unwrap_err();
        assert!(
            matches!(&err, crate::Error::ParameterValidation { action, .. } if action == "sum")
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_action_schema_aborts() {
        let planner = ParameterPlanner::new("");
        let provider = ScriptedProvider::new(vec![]);
        let action = Action::builder("broken")
            .parameters(json!({"type": 42}))
            .handler(|_, _| Ok(Value::Null))
            .build()
            .unwrap();
        let state = InteractionState::new("hi");

        let err = planner.plan(&provider, &action, &state).await.unwrap_err();
        assert!(matches!(err, crate::Error::SchemaCompile { .. }));
        assert!(err.is_configuration_error());
        // The provider was never consulted for a defective schema.
        assert_eq!(provider.calls(), 0);
    }
}
