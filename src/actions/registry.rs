//! Action registry with dependency-aware readiness checks.

use std::collections::{HashMap, HashSet};

use super::Action;
use crate::agent::ExecutedAction;

/// Static, in-memory set of action definitions.
///
/// Reads are side-effect-free; there is no hidden state beyond the
/// registration map. Registration order is preserved so readiness results
/// are deterministic.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<Action>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    /// Register a set of actions. Fails if two actions share an id.
    pub fn new(actions: Vec<Action>) -> crate::Result<Self> {
        let mut registry = Self::default();
        registry.extend(actions)?;
        Ok(registry)
    }

    /// Merge additional actions (e.g. dynamically discovered ones) before
    /// an interaction starts. The duplicate-id check applies across the
    /// whole registry.
    pub fn extend(&mut self, actions: Vec<Action>) -> crate::Result<()> {
        for action in actions {
            if self.index.contains_key(&action.id) {
                return Err(crate::Error::DuplicateActionId(action.id));
            }
            self.index.insert(action.id.clone(), self.actions.len());
            self.actions.push(action);
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.index.get(id).map(|&i| &self.actions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Every action whose dependencies are fully satisfied by successful
    /// entries in `executed` and that has not terminally failed this
    /// interaction. Successful actions stay ready: re-execution is legal
    /// and common (the same operation may run once per step of a chain).
    pub fn ready_actions(&self, executed: &[ExecutedAction]) -> Vec<&Action> {
        let succeeded: HashSet<&str> = executed
            .iter()
            .filter(|a| a.status.is_success())
            .map(|a| a.action_id.as_str())
            .collect();
        let exhausted: HashSet<&str> = executed
            .iter()
            .filter(|a| a.status.is_exhausted())
            .map(|a| a.action_id.as_str())
            .collect();

        self.actions
            .iter()
            .filter(|action| {
                !exhausted.contains(action.id.as_str())
                    && action
                        .depends_on
                        .iter()
                        .all(|dep| succeeded.contains(dep.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ActionStatus;
    use chrono::Utc;
    use serde_json::{Value, json};

    fn action(id: &str, deps: &[&str]) -> Action {
        Action::builder(id)
            .description("test action")
            .depends_on(deps.iter().copied())
            .handler(|_, _| Ok(Value::Null))
            .build()
            .unwrap()
    }

    fn executed(id: &str, status: ActionStatus) -> ExecutedAction {
        ExecutedAction {
            action_id: id.to_string(),
            parameters: json!({}),
            status,
            result: None,
            error_message: None,
            retry_count: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = ActionRegistry::new(vec![action("sum", &[]), action("sum", &[])]).unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateActionId(id) if id == "sum"));
    }

    #[test]
    fn test_ready_requires_successful_dependency() {
        let registry =
            ActionRegistry::new(vec![action("fetch", &[]), action("report", &["fetch"])]).unwrap();

        let ready = registry.ready_actions(&[]);
        assert_eq!(ready.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), ["fetch"]);

        // A failed dependency does not unlock the dependent.
        let ready = registry.ready_actions(&[executed("fetch", ActionStatus::Error)]);
        assert_eq!(ready.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), ["fetch"]);

        let ready = registry.ready_actions(&[executed("fetch", ActionStatus::Success)]);
        assert_eq!(
            ready.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            ["fetch", "report"]
        );
    }

    #[test]
    fn test_exhausted_action_is_removed() {
        let registry = ActionRegistry::new(vec![action("sum", &[]), action("minus", &[])]).unwrap();

        let ready = registry.ready_actions(&[executed("sum", ActionStatus::MaxRetriesExceeded)]);
        assert_eq!(ready.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), ["minus"]);
    }

    #[test]
    fn test_successful_action_stays_ready() {
        let registry = ActionRegistry::new(vec![action("sum", &[])]).unwrap();
        let ready = registry.ready_actions(&[executed("sum", ActionStatus::Success)]);
        assert_eq!(ready.len(), 1);
    }

    #[test]
    fn test_extend_checks_across_registry() {
        let mut registry = ActionRegistry::new(vec![action("sum", &[])]).unwrap();
        assert!(registry.extend(vec![action("minus", &[])]).is_ok());
        let err = registry.extend(vec![action("sum", &[])]).unwrap_err();
        assert!(matches!(err, crate::Error::DuplicateActionId(_)));
        assert_eq!(registry.len(), 2);
    }
}
