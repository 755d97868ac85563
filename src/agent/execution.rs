//! The interaction loop.
//!
//! One `run` call is one interaction: plan, execute, repeat until the
//! planner returns an empty plan or the round ceiling is reached, then
//! format the final response from whatever state exists. Planner protocol
//! errors trigger a rerun round; provider and configuration errors abort.

use std::time::Instant;

use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use super::events::{InteractionMetrics, InteractionResult};
use super::executor::Agent;
use super::state::InteractionState;
use crate::engine::ExecutionEngine;
use crate::observability::{Phase, PhaseEvent, emit};

impl Agent {
    /// Run one interaction with a fresh state.
    pub async fn run(&self, input: impl Into<String>) -> crate::Result<InteractionResult> {
        self.run_with_state(InteractionState::new(input)).await
    }

    /// Run one interaction with an explicit state, typically produced by
    /// [`InteractionState::continue_from`] or deserialized from storage.
    #[instrument(skip(self, state), fields(session_id = %self.session_id, input_len = state.input.len()))]
    pub async fn run_with_state(
        &self,
        mut state: InteractionState,
    ) -> crate::Result<InteractionResult> {
        let interaction_id = uuid::Uuid::new_v4();
        let started = Instant::now();
        let mut metrics = InteractionMetrics::default();
        let mut engine = ExecutionEngine::new();
        let sink = self.sink.as_deref();

        info!(%interaction_id, "Interaction started");
        emit(
            sink,
            self.event(Phase::InteractionStart, interaction_id)
                .payload(json!({"input": &state.input})),
        );

        let mut is_rerun = false;
        while metrics.rounds < self.config.max_rounds {
            metrics.rounds += 1;

            let ready = self.registry.ready_actions(&state.executed_actions);
            let plan = match self
                .next_action_planner
                .plan(self.provider.as_ref(), &state, &ready, is_rerun)
                .await
            {
                Ok(outcome) => outcome,
                Err(crate::Error::InvalidPlannerOutput(message)) => {
                    // Protocol error: surface it to the planner as a rerun
                    // instead of aborting the interaction.
                    warn!(%interaction_id, error = %message, "Invalid action plan, rerunning");
                    metrics.record_planner_error();
                    emit(
                        sink,
                        self.event(Phase::PlanNextActions, interaction_id)
                            .failed()
                            .payload(json!({"error": message})),
                    );
                    is_rerun = true;
                    continue;
                }
                Err(other) => return Err(other),
            };
            metrics.record_planner(&plan);
            emit(
                sink,
                self.event(Phase::PlanNextActions, interaction_id)
                    .duration_ms(plan.duration_ms)
                    .cost_cents(plan.cost_cents)
                    .payload(json!({
                        "actions": &plan.content.actions,
                        "reasoning": &plan.content.reasoning,
                        "is_rerun": is_rerun,
                    })),
            );

            if plan.content.actions.is_empty() {
                debug!(%interaction_id, "Planner returned an empty plan, responding");
                break;
            }

            let mut round_failed = false;
            for action_id in &plan.content.actions {
                let Some(action) = self.registry.get(action_id) else {
                    // Validated by the planner; only reachable if the
                    // registry changed mid-interaction.
                    continue;
                };

                // Re-check at execution time: an earlier action in this
                // same plan may have failed a dependency or exhausted the
                // action since planning.
                if !Self::executable_now(action, &state) {
                    debug!(action = %action.id, "Deferring action, prerequisites no longer hold");
                    continue;
                }

                let parameters = match self.plan_parameters(action, &state, &mut metrics, &interaction_id).await {
                    Ok(parameters) => parameters,
                    Err(ParameterFailure::Retryable(message)) => {
                        let record = engine.record_planner_failure(action, message, None);
                        state.executed_actions.push(record);
                        round_failed = true;
                        continue;
                    }
                    Err(ParameterFailure::Fatal(err)) => return Err(err),
                };

                let execute_started = Instant::now();
                let record = engine.execute(action, parameters, &mut state.context).await;
                metrics.actions_executed += 1;

                let mut event = self
                    .event(Phase::ExecuteAction, interaction_id)
                    .duration_ms(execute_started.elapsed().as_millis() as u64)
                    .payload(json!({
                        "action": &record.action_id,
                        "status": record.status,
                        "retry_count": record.retry_count,
                        "error": &record.error_message,
                    }));
                if !record.is_success() {
                    metrics.errors += 1;
                    round_failed = true;
                    event = event.failed();
                }
                emit(sink, event);

                state.executed_actions.push(record);
            }

            is_rerun = round_failed;
        }

        let response = match self
            .response_planner
            .plan(self.provider.as_ref(), &state, &self.config.response_format)
            .await
        {
            Ok(outcome) => {
                metrics.record_planner(&outcome);
                emit(
                    sink,
                    self.event(Phase::PlanFinalResponse, interaction_id)
                        .duration_ms(outcome.duration_ms)
                        .cost_cents(outcome.cost_cents)
                        .payload(json!({"reasoning": &outcome.content.reasoning})),
                );
                outcome.content.response
            }
            Err(err) => {
                metrics.record_planner_error();
                emit(
                    sink,
                    self.event(Phase::PlanFinalResponse, interaction_id)
                        .failed()
                        .payload(json!({"error": err.to_string()})),
                );
                return Err(err);
            }
        };

        metrics.execution_time_ms = started.elapsed().as_millis() as u64;
        info!(
            %interaction_id,
            rounds = metrics.rounds,
            actions_executed = metrics.actions_executed,
            cost_cents = %metrics.cost_cents,
            "Interaction complete"
        );
        emit(
            sink,
            self.event(Phase::InteractionComplete, interaction_id)
                .duration_ms(metrics.execution_time_ms)
                .cost_cents(metrics.cost_cents)
                .payload(json!({
                    "rounds": metrics.rounds,
                    "planner_calls": metrics.planner_calls,
                    "actions_executed": metrics.actions_executed,
                    "errors": metrics.errors,
                })),
        );

        Ok(InteractionResult {
            interaction_id,
            response,
            state,
            metrics,
        })
    }

    /// Derive parameters for one action, classifying failures into
    /// retryable (consumes the action's budget, round continues) and fatal
    /// (aborts the interaction).
    async fn plan_parameters(
        &self,
        action: &crate::actions::Action,
        state: &InteractionState,
        metrics: &mut InteractionMetrics,
        interaction_id: &uuid::Uuid,
    ) -> Result<Value, ParameterFailure> {
        // Schema-less actions run with an empty parameter object and make
        // no planner call.
        if action.parameters.is_none() {
            return Ok(json!({}));
        }

        match self
            .parameter_planner
            .plan(self.provider.as_ref(), action, state)
            .await
        {
            Ok(outcome) => {
                metrics.record_planner(&outcome);
                emit(
                    self.sink.as_deref(),
                    self.event(Phase::PlanActionParameters, *interaction_id)
                        .duration_ms(outcome.duration_ms)
                        .cost_cents(outcome.cost_cents)
                        .payload(json!({
                            "action": &action.id,
                            "parameters": &outcome.content.parameters,
                        })),
                );
                Ok(outcome.content.parameters)
            }
            Err(err) if err.is_retryable() => {
                let message = err.to_string();
                warn!(action = %action.id, error = %message, "Parameter planning failed");
                metrics.record_planner_error();
                emit(
                    self.sink.as_deref(),
                    self.event(Phase::PlanActionParameters, *interaction_id)
                        .failed()
                        .payload(json!({"action": &action.id, "error": &message})),
                );
                Err(ParameterFailure::Retryable(message))
            }
            Err(err) => Err(ParameterFailure::Fatal(err)),
        }
    }

    /// Whether an action may execute against the current state: its
    /// dependencies all succeeded this interaction and its retry budget is
    /// not exhausted.
    fn executable_now(action: &crate::actions::Action, state: &InteractionState) -> bool {
        let succeeded = state.successful_ids();
        let exhausted = state
            .executed_actions
            .iter()
            .any(|a| a.action_id == action.id && a.status.is_exhausted());
        !exhausted
            && action
                .depends_on
                .iter()
                .all(|dep| succeeded.contains(&dep.as_str()))
    }

    fn event(&self, phase: Phase, interaction_id: uuid::Uuid) -> PhaseEvent {
        PhaseEvent::new(phase, self.session_id, interaction_id)
    }
}

enum ParameterFailure {
    /// Consumes the action's retry budget; the interaction continues.
    Retryable(String),
    /// Aborts the interaction.
    Fatal(crate::Error),
}
