//! Phase events and pluggable sinks.
//!
//! The interaction loop emits one [`PhaseEvent`] per phase transition.
//! Delivery is fire-and-forget: a sink failure is logged and never
//! affects the interaction outcome.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

/// Lifecycle phase of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InteractionStart,
    PlanNextActions,
    PlanActionParameters,
    ExecuteAction,
    PlanFinalResponse,
    InteractionComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Failed,
}

/// One observable phase transition, with enough identity to correlate
/// events across interactions of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseEvent {
    pub phase: Phase,
    pub status: PhaseStatus,
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    pub interaction_id: Uuid,
    pub duration_ms: u64,
    /// Cost of this phase in fractional cents; zero for phases that make
    /// no planner call.
    pub cost_cents: Decimal,
    /// Phase-specific detail: chosen actions, parameters, errors.
    pub payload: Value,
}

impl PhaseEvent {
    pub fn new(phase: Phase, session_id: Uuid, interaction_id: Uuid) -> Self {
        Self {
            phase,
            status: PhaseStatus::Completed,
            timestamp: Utc::now(),
            session_id,
            interaction_id,
            duration_ms: 0,
            cost_cents: Decimal::ZERO,
            payload: Value::Null,
        }
    }

    pub fn failed(mut self) -> Self {
        self.status = PhaseStatus::Failed;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn cost_cents(mut self, cost_cents: Decimal) -> Self {
        self.cost_cents = cost_cents;
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Destination for phase events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &PhaseEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Deliver an event to an optional sink. Sink errors and panics are both
/// contained here; delivery can never fail the interaction.
pub(crate) fn emit(sink: Option<&dyn EventSink>, event: PhaseEvent) {
    let Some(sink) = sink else { return };
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink.record(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            warn!(phase = ?event.phase, error = %err, "Event sink rejected phase event");
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            warn!(phase = ?event.phase, panic = %message, "Event sink panicked");
        }
    }
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &PhaseEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            phase = ?event.phase,
            status = ?event.status,
            interaction_id = %event.interaction_id,
            duration_ms = event.duration_ms,
            cost_cents = %event.cost_cents,
            "Phase event"
        );
        Ok(())
    }
}

/// Sink that collects events in memory, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<PhaseEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PhaseEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.events().iter().map(|e| e.phase).collect()
    }
}

impl EventSink for CollectingSink {
    fn record(&self, event: &PhaseEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.events
            .lock()
            .map_err(|_| "event buffer poisoned")?
            .push(event.clone());
        Ok(())
    }
}
