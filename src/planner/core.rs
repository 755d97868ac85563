//! Shared planner behavior: prompt-state formatting and cost accounting.

use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tracing::warn;

use crate::actions::Action;
use crate::agent::{ExecutedAction, InteractionState};

/// Context keys that are loop bookkeeping, never shown to the planner.
pub(crate) const INTERNAL_CONTEXT_KEYS: &[&str] = &["executed_actions", "previous_actions"];

/// Running cost total for one planner role, in fractional cents.
///
/// Stored as micro-cents in an atomic so roles can be shared across
/// concurrent interactions without a lock. Reset only on explicit request.
#[derive(Debug, Default)]
pub struct CostLedger {
    micro_cents: AtomicU64,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, cost_cents: Decimal) {
        let micros = cost_cents
            .checked_mul(Decimal::from(1_000_000u64))
            .and_then(|m| m.to_u64());
        let micros = match micros {
            Some(micros) => micros,
            None => {
                // Negative clamps to zero, overflow saturates; either way
                // the bad figure is visible in the log.
                warn!(%cost_cents, "Cost outside the ledger's range, saturating");
                if cost_cents.is_sign_negative() { 0 } else { u64::MAX }
            }
        };
        let _ = self
            .micro_cents
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(micros))
            });
    }

    pub fn total(&self) -> Decimal {
        Decimal::from(self.micro_cents.load(Ordering::Relaxed)) / Decimal::from(1_000_000u64)
    }

    pub fn reset(&self) {
        self.micro_cents.store(0, Ordering::Relaxed);
    }
}

/// State shared by the three planner roles: the agent instructions, the
/// role's cost ledger, and the formatting of interaction state into prompt
/// variables. Composed by each role rather than inherited.
#[derive(Debug)]
pub struct PlannerCore {
    instructions: String,
    ledger: CostLedger,
}

impl PlannerCore {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            ledger: CostLedger::new(),
        }
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn track_cost(&self, cost_cents: Decimal) {
        self.ledger.record(cost_cents);
    }

    pub fn total_cost(&self) -> Decimal {
        self.ledger.total()
    }

    pub fn reset_cost(&self) {
        self.ledger.reset();
    }

    /// Serialized action catalog for the planner prompt: id, description,
    /// and declared dependencies.
    pub fn format_available_actions(&self, actions: &[&Action]) -> String {
        actions
            .iter()
            .map(|a| {
                format!(
                    "{}:\n  description: {}\n  dependencies: {}",
                    a.id,
                    a.description,
                    serde_json::to_string(&a.depends_on).unwrap_or_else(|_| "[]".into())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_context(&self, state: &InteractionState) -> String {
        let visible = state.context.to_value_excluding(INTERNAL_CONTEXT_KEYS);
        serde_json::to_string_pretty(&visible).unwrap_or_else(|_| "{}".into())
    }

    pub fn format_executed(&self, executed: &[ExecutedAction]) -> String {
        serde_json::to_string_pretty(executed).unwrap_or_else(|_| "[]".into())
    }

    /// Full planner-visible state in one block: input, context, this
    /// turn's history, and prior interactions' history.
    pub fn format_planner_state(&self, state: &InteractionState) -> String {
        let view = json!({
            "input": &state.input,
            "context": state.context.to_value_excluding(INTERNAL_CONTEXT_KEYS),
            "executed_actions": &state.executed_actions,
            "previous_actions": &state.previous_actions,
        });
        serde_json::to_string_pretty(&view).unwrap_or_else(|_| "{}".into())
    }
}

/// One planner call's content plus its accounting figures, consumed by the
/// interaction loop for metrics and phase events.
#[derive(Debug, Clone)]
pub struct PlannerOutcome<T> {
    pub content: T,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub cost_cents: Decimal,
    pub duration_ms: u64,
    pub raw_output: String,
}

impl<T> PlannerOutcome<T> {
    pub(crate) fn from_completion(
        content: T,
        completion: &crate::completion::Completion,
        duration_ms: u64,
    ) -> Self {
        Self {
            content,
            input_tokens: completion.input_tokens,
            output_tokens: completion.output_tokens,
            cost_cents: completion.cost_cents,
            duration_ms,
            raw_output: completion.raw_output.clone(),
        }
    }
}

/// Decode a planner completion's content into its typed result.
pub(crate) fn decode_content<T: serde::de::DeserializeOwned>(content: Value) -> crate::Result<T> {
    serde_json::from_value(content)
        .map_err(|e| crate::Error::InvalidPlannerOutput(format!("malformed planner output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cost_ledger_accumulates_and_resets() {
        let ledger = CostLedger::new();
        ledger.record(dec!(0.5));
        ledger.record(dec!(1.25));
        assert_eq!(ledger.total(), dec!(1.75));

        ledger.reset();
        assert_eq!(ledger.total(), Decimal::ZERO);
    }

    #[test]
    fn test_cost_ledger_saturates_out_of_range_costs() {
        let ledger = CostLedger::new();
        ledger.record(dec!(0.5));
        // A negative figure clamps to zero instead of corrupting the total.
        ledger.record(dec!(-3));
        assert_eq!(ledger.total(), dec!(0.5));

        // An overflowing figure saturates the ledger rather than wrapping.
        ledger.record(Decimal::MAX);
        assert_eq!(
            ledger.total(),
            Decimal::from(u64::MAX) / Decimal::from(1_000_000u64)
        );
    }

    #[test]
    fn test_cost_ledger_keeps_fractional_cents() {
        let ledger = CostLedger::new();
        ledger.record(dec!(0.000001));
        assert_eq!(ledger.total(), dec!(0.000001));
    }

    #[test]
    fn test_format_available_actions() {
        let core = PlannerCore::new("");
        let sum = Action::builder("sum")
            .description("Adds two numbers")
            .handler(|_, _| Ok(Value::Null))
            .build()
            .unwrap();
        let formatted = core.format_available_actions(&[&sum]);
        assert!(formatted.contains("sum:"));
        assert!(formatted.contains("Adds two numbers"));
        assert!(formatted.contains("dependencies: []"));
    }

    #[test]
    fn test_planner_state_hides_internal_keys() {
        let core = PlannerCore::new("");
        let mut state = InteractionState::new("hi");
        state.context.set("result", 15);
        state.context.set("executed_actions", "bookkeeping");

        let formatted = core.format_context(&state);
        assert!(formatted.contains("result"));
        assert!(!formatted.contains("bookkeeping"));
    }
}
