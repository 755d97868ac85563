//! The agent: registry, planners, provider, and session identity.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::config::AgentConfig;
use super::options::AgentBuilder;
use crate::actions::ActionRegistry;
use crate::completion::CompletionProvider;
use crate::observability::EventSink;
use crate::planner::{NextActionPlanner, ParameterPlanner, ResponsePlanner};

/// A configured agent. Cheap to keep alive for a whole session; each call
/// to [`Agent::run`](crate::agent::Agent::run) is one interaction.
pub struct Agent {
    pub(super) registry: ActionRegistry,
    pub(super) provider: Arc<dyn CompletionProvider>,
    pub(super) next_action_planner: NextActionPlanner,
    pub(super) parameter_planner: ParameterPlanner,
    pub(super) response_planner: ResponsePlanner,
    pub(super) sink: Option<Arc<dyn EventSink>>,
    pub(super) config: AgentConfig,
    pub(super) session_id: Uuid,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl Agent {
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Lifetime planner cost of this agent across all interactions, in
    /// fractional cents.
    pub fn total_planner_cost(&self) -> Decimal {
        self.next_action_planner.core().total_cost()
            + self.parameter_planner.core().total_cost()
            + self.response_planner.core().total_cost()
    }

    pub fn reset_planner_costs(&self) {
        self.next_action_planner.core().reset_cost();
        self.parameter_planner.core().reset_cost();
        self.response_planner.core().reset_cost();
    }
}
