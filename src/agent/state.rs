//! Interaction state: context store, execution history, turn state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form key/value store carried across rounds and interactions of a
/// session. Action bodies read and write it; it is the only channel through
/// which one action's output can reach a later action's parameters.
///
/// Single writer at a time by construction: the interaction loop is strictly
/// sequential, so no locking is needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextState {
    entries: serde_json::Map<String, Value>,
}

impl ContextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Snapshot as a JSON object, excluding the given keys.
    pub fn to_value_excluding(&self, excluded: &[&str]) -> Value {
        let filtered: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .filter(|(k, _)| !excluded.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(filtered)
    }
}

impl From<serde_json::Map<String, Value>> for ContextState {
    fn from(entries: serde_json::Map<String, Value>) -> Self {
        Self { entries }
    }
}

/// Outcome of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Success,
    Error,
    MaxRetriesExceeded,
}

impl ActionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Terminal for this action this interaction: must not be re-selected.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::MaxRetriesExceeded)
    }
}

/// Record of one execution attempt. Append-only; immutable once written.
/// Ordering is execution order and must be preserved exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedAction {
    pub action_id: String,
    pub parameters: Value,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub timestamp: DateTime<Utc>,
}

impl ExecutedAction {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// State of a single user turn. Created at interaction start, mutated by
/// action bodies (through [`ContextState`]) and by the loop appending
/// history, handed back to the caller at interaction end.
///
/// Serde round-trippable: a session can be persisted and resumed, and
/// resuming with a deterministic planner reproduces the same next choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionState {
    /// The request text for this turn.
    pub input: String,
    /// Actions executed this turn, in execution order.
    pub executed_actions: Vec<ExecutedAction>,
    /// Shared context carried across the whole session.
    pub context: ContextState,
    /// Read-only action history of prior completed interactions,
    /// used as planner context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_actions: Vec<ExecutedAction>,
}

impl InteractionState {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Begin a new interaction from a completed one: this turn's history
    /// folds into `previous_actions`, the context is carried as-is.
    pub fn continue_from(prior: InteractionState, input: impl Into<String>) -> Self {
        let mut previous = prior.previous_actions;
        previous.extend(prior.executed_actions);
        Self {
            input: input.into(),
            executed_actions: Vec::new(),
            context: prior.context,
            previous_actions: previous,
        }
    }

    /// Ids of actions that have succeeded this turn.
    pub fn successful_ids(&self) -> Vec<&str> {
        self.executed_actions
            .iter()
            .filter(|a| a.is_success())
            .map(|a| a.action_id.as_str())
            .collect()
    }
}
