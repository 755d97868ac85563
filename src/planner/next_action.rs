//! Next-action planning: which ready actions to run this round, in order.

use std::time::Instant;

use tracing::debug;

use super::core::{PlannerCore, PlannerOutcome, decode_content};
use super::prompts::{PLAN_NEXT_ACTIONS_PROMPT, PLAN_NEXT_ACTIONS_RERUN_PROMPT, render};
use super::schemas::{PlannedActions, schema_of};
use crate::actions::Action;
use crate::agent::InteractionState;
use crate::completion::{CompletionProvider, CompletionRequest};

pub struct NextActionPlanner {
    core: PlannerCore,
}

impl NextActionPlanner {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            core: PlannerCore::new(instructions),
        }
    }

    pub fn core(&self) -> &PlannerCore {
        &self.core
    }

    /// Ask the reasoning service which ready actions to run next.
    ///
    /// `is_rerun` selects the rerun prompt variant after a failed round so
    /// the service can explain the attempted fix. Every returned id must
    /// be in the ready set; anything else is
    /// [`crate::Error::InvalidPlannerOutput`] and is surfaced, never
    /// silently dropped or substituted.
    pub async fn plan(
        &self,
        provider: &dyn CompletionProvider,
        state: &InteractionState,
        available: &[&Action],
        is_rerun: bool,
    ) -> crate::Result<PlannerOutcome<PlannedActions>> {
        let template = if is_rerun {
            PLAN_NEXT_ACTIONS_RERUN_PROMPT
        } else {
            PLAN_NEXT_ACTIONS_PROMPT
        };

        let prompt = render(
            template,
            &[
                ("instructions", self.core.instructions()),
                ("input", &state.input),
                (
                    "available_actions",
                    &self.core.format_available_actions(available),
                ),
                ("context", &self.core.format_context(state)),
                (
                    "executed_actions",
                    &self.core.format_executed(&state.executed_actions),
                ),
                (
                    "previous_actions",
                    &self.core.format_executed(&state.previous_actions),
                ),
            ],
        );

        let start = Instant::now();
        let completion = provider
            .complete(CompletionRequest::new(prompt, schema_of::<PlannedActions>()))
            .await?;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.core.track_cost(completion.cost_cents);

        let planned: PlannedActions = decode_content(completion.content.clone())?;

        for id in &planned.actions {
            if !available.iter().any(|a| &a.id == id) {
                return Err(crate::Error::InvalidPlannerOutput(format!(
                    "planner chose action '{}' which is not in the ready set",
                    id
                )));
            }
        }

        debug!(
            actions = ?planned.actions,
            is_rerun,
            duration_ms,
            "Planned next actions"
        );

        Ok(PlannerOutcome::from_completion(
            planned,
            &completion,
            duration_ms,
        ))
    }
}
