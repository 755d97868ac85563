//! Action execution with per-interaction retry accounting.
//!
//! The engine owns the retry counters for one interaction. A retry budget
//! unit is consumed whenever a proposed execution fails, whether the
//! failure came from the action body or from parameter planning; the
//! planner sees both as an identical failed [`ExecutedAction`].

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::actions::Action;
use crate::agent::{ActionStatus, ContextState, ExecutedAction};

/// Executes action bodies and tracks retry budgets for one interaction.
///
/// Not shared across interactions: the loop creates a fresh engine per
/// turn so every action starts with its full budget.
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    retry_counts: HashMap<String, u32>,
}

impl ExecutionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failed attempts recorded so far for an action this interaction.
    pub fn attempts(&self, action_id: &str) -> u32 {
        self.retry_counts.get(action_id).copied().unwrap_or(0)
    }

    /// Run an action body with already-validated parameters.
    ///
    /// Never returns an error: the body's outcome is folded into the
    /// returned [`ExecutedAction`] so the planner can reason about it on
    /// the next round. An action whose failures exceed its retry budget
    /// is marked [`ActionStatus::MaxRetriesExceeded`] and becomes
    /// unselectable for the rest of the interaction.
    pub async fn execute(
        &mut self,
        action: &Action,
        parameters: Value,
        state: &mut ContextState,
    ) -> ExecutedAction {
        let prior_failures = self.attempts(&action.id);

        match action.run(state, parameters.clone()).await {
            Ok(result) => {
                debug!(action = %action.id, retry_count = prior_failures, "Action succeeded");
                ExecutedAction {
                    action_id: action.id.clone(),
                    parameters,
                    status: ActionStatus::Success,
                    result: Some(result),
                    error_message: None,
                    retry_count: prior_failures,
                    timestamp: Utc::now(),
                }
            }
            Err(err) => self.record_failure(action, parameters, err.to_string()),
        }
    }

    /// Record a failure that happened before the body ran, such as planner
    /// output failing schema validation. Consumes the same retry budget as
    /// a body failure.
    pub fn record_planner_failure(
        &mut self,
        action: &Action,
        message: impl Into<String>,
        parameters: Option<Value>,
    ) -> ExecutedAction {
        self.record_failure(
            action,
            parameters.unwrap_or(Value::Null),
            message.into(),
        )
    }

    fn record_failure(
        &mut self,
        action: &Action,
        parameters: Value,
        message: String,
    ) -> ExecutedAction {
        let failures = self.retry_counts.entry(action.id.clone()).or_insert(0);
        *failures += 1;

        let status = if *failures > action.retries {
            warn!(
                action = %action.id,
                failures = *failures,
                budget = action.retries,
                error = %message,
                "Action exhausted its retry budget"
            );
            ActionStatus::MaxRetriesExceeded
        } else {
            debug!(
                action = %action.id,
                failures = *failures,
                budget = action.retries,
                error = %message,
                "Action failed, retry budget remaining"
            );
            ActionStatus::Error
        };

        ExecutedAction {
            action_id: action.id.clone(),
            parameters,
            status,
            result: None,
            error_message: Some(message),
            retry_count: *failures,
            timestamp: Utc::now(),
        }
    }
}
