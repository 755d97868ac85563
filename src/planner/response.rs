//! Response planning: format the final, truthful answer.

use std::time::Instant;

use tracing::debug;

use super::core::{PlannerCore, PlannerOutcome, decode_content};
use super::prompts::{FORMAT_RESPONSE_PROMPT, render};
use super::schemas::{PlannedResponse, schema_of};
use crate::agent::{InteractionState, ResponseFormat};
use crate::completion::{CompletionProvider, CompletionRequest};

pub struct ResponsePlanner {
    core: PlannerCore,
}

impl ResponsePlanner {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            core: PlannerCore::new(instructions),
        }
    }

    pub fn core(&self) -> &PlannerCore {
        &self.core
    }

    /// Produce the human-facing final answer from the full interaction
    /// state. In [`ResponseFormat::Json`] mode the output is the
    /// schema-conformant content itself and no reasoning is required of
    /// the service.
    pub async fn plan(
        &self,
        provider: &dyn CompletionProvider,
        state: &InteractionState,
        format: &ResponseFormat,
    ) -> crate::Result<PlannerOutcome<PlannedResponse>> {
        let format_instructions = match format {
            ResponseFormat::Json(schema) => format!(
                "Format the response as JSON conforming to this schema:\n{}",
                serde_json::to_string_pretty(schema).unwrap_or_else(|_| "{}".into())
            ),
            ResponseFormat::Text => {
                "Format the response as a clear text summary of what was done and the outcomes."
                    .to_string()
            }
        };

        let prompt = render(
            FORMAT_RESPONSE_PROMPT,
            &[
                ("instructions", self.core.instructions()),
                ("input", &state.input),
                ("response_format", &format_instructions),
                ("planner_state", &self.core.format_planner_state(state)),
            ],
        );

        let start = Instant::now();
        let outcome = match format {
            ResponseFormat::Json(schema) => {
                let completion = provider
                    .complete(CompletionRequest::new(prompt, schema.clone()))
                    .await?;
                let duration_ms = start.elapsed().as_millis() as u64;
                self.core.track_cost(completion.cost_cents);

                let planned = PlannedResponse {
                    response: completion.content.clone(),
                    reasoning: Some(
                        "Response formatted as JSON conforming to the requested schema".into(),
                    ),
                };
                PlannerOutcome::from_completion(planned, &completion, duration_ms)
            }
            ResponseFormat::Text => {
                let completion = provider
                    .complete(CompletionRequest::new(
                        prompt,
                        schema_of::<PlannedResponse>(),
                    ))
                    .await?;
                let duration_ms = start.elapsed().as_millis() as u64;
                self.core.track_cost(completion.cost_cents);

                let planned: PlannedResponse = decode_content(completion.content.clone())?;
                PlannerOutcome::from_completion(planned, &completion, duration_ms)
            }
        };

        debug!(duration_ms = outcome.duration_ms, "Planned final response");
        Ok(outcome)
    }
}
