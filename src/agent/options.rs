//! Agent builder.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use super::config::{AgentConfig, ResponseFormat};
use super::executor::Agent;
use crate::actions::{Action, ActionRegistry, ActionSource, load_sources};
use crate::completion::CompletionProvider;
use crate::observability::EventSink;
use crate::planner::{NextActionPlanner, ParameterPlanner, ResponsePlanner};

/// Builder for [`Agent`]. `build` is async because action sources may load
/// their actions over the network.
#[derive(Default)]
pub struct AgentBuilder {
    instructions: String,
    actions: Vec<Action>,
    sources: Vec<Box<dyn ActionSource>>,
    provider: Option<Arc<dyn CompletionProvider>>,
    config: AgentConfig,
    sink: Option<Arc<dyn EventSink>>,
    session_id: Option<Uuid>,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// System instructions prefixed to every planner prompt.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self.config.instructions = self.instructions.clone();
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add a dynamic action source, loaded once at build time.
    pub fn source(mut self, source: Box<dyn ActionSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn max_rounds(mut self, max_rounds: u32) -> Self {
        self.config.max_rounds = max_rounds;
        self
    }

    /// Request the final response as JSON conforming to `schema` instead
    /// of plain text.
    pub fn response_schema(mut self, schema: Value) -> Self {
        self.config.response_format = ResponseFormat::Json(schema);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Fixed session id, e.g. when resuming a persisted session. A fresh
    /// one is generated otherwise.
    pub fn session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub async fn build(self) -> crate::Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| crate::Error::Config("agent has no completion provider".into()))?;

        let mut actions = self.actions;
        actions.extend(load_sources(&self.sources).await?);
        let registry = ActionRegistry::new(actions)?;

        Ok(Agent {
            registry,
            provider,
            next_action_planner: NextActionPlanner::new(self.instructions.clone()),
            parameter_planner: ParameterPlanner::new(self.instructions.clone()),
            response_planner: ResponsePlanner::new(self.instructions),
            sink: self.sink,
            config: self.config,
            session_id: self.session_id.unwrap_or_else(Uuid::new_v4),
        })
    }
}
