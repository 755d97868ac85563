//! Interaction results and accounting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::InteractionState;
use crate::planner::PlannerOutcome;

/// Aggregated accounting for one interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionMetrics {
    /// Planning rounds run, including failed ones.
    pub rounds: u32,
    /// Completion calls across all three planner roles.
    pub planner_calls: u32,
    /// Execution attempts, counting each retry.
    pub actions_executed: u32,
    /// Failed execution attempts plus planner protocol errors.
    pub errors: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Total completion cost in fractional cents.
    pub cost_cents: Decimal,
    pub execution_time_ms: u64,
}

impl InteractionMetrics {
    /// Fold one planner call's accounting into the totals.
    pub(crate) fn record_planner<T>(&mut self, outcome: &PlannerOutcome<T>) {
        self.planner_calls += 1;
        self.input_tokens += u64::from(outcome.input_tokens);
        self.output_tokens += u64::from(outcome.output_tokens);
        self.cost_cents += outcome.cost_cents;
    }

    /// Record a planner call that failed before yielding an outcome.
    pub(crate) fn record_planner_error(&mut self) {
        self.planner_calls += 1;
        self.errors += 1;
    }
}

/// Everything one interaction produced: the final response, the state to
/// continue the session from, and the accounting.
#[derive(Debug, Clone)]
pub struct InteractionResult {
    pub interaction_id: Uuid,
    /// Final response; a JSON string in text mode, schema-conformant JSON
    /// in JSON mode.
    pub response: Value,
    /// Final interaction state, suitable for
    /// [`InteractionState::continue_from`].
    pub state: InteractionState,
    pub metrics: InteractionMetrics,
}

impl InteractionResult {
    /// The response as plain text, when it is a string.
    pub fn response_text(&self) -> Option<&str> {
        self.response.as_str()
    }
}
