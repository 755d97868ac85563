//! Action definition and builder.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::ContextState;

/// Default retry budget for an action.
pub const DEFAULT_RETRIES: u32 = 2;

/// Error returned by an action body.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ActionError(pub String);

impl ActionError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Executable body of an action.
///
/// Receives the shared context state and parameters that have already been
/// validated against the action's schema. Returns an opaque result value on
/// success; any state it wants later actions to see goes into `state`.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(&self, state: &mut ContextState, parameters: Value)
        -> Result<Value, ActionError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> ActionHandler for FnHandler<F>
where
    F: Fn(&mut ContextState, Value) -> Result<Value, ActionError> + Send + Sync,
{
    async fn run(
        &self,
        state: &mut ContextState,
        parameters: Value,
    ) -> Result<Value, ActionError> {
        (self.0)(state, parameters)
    }
}

/// Immutable definition of a registered operation.
///
/// Created at registration time, never mutated; lives as long as the
/// registry. The `description` and `additional_instructions` are planner
/// input only and carry no semantics for the engine.
#[derive(Clone)]
pub struct Action {
    pub id: String,
    pub description: String,
    /// JSON Schema for the action's parameters. Actions without a schema
    /// run with an empty parameter object and skip parameter planning.
    pub parameters: Option<Value>,
    /// Extra prompt guidance for the parameter planner.
    pub additional_instructions: Option<String>,
    /// Ids that must have succeeded earlier in the same interaction.
    pub depends_on: Vec<String>,
    /// Retry budget; the action fails terminally on attempt `retries + 1`.
    pub retries: u32,
    handler: Arc<dyn ActionHandler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("depends_on", &self.depends_on)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl Action {
    #[must_use]
    pub fn builder(id: impl Into<String>) -> ActionBuilder {
        ActionBuilder::new(id)
    }

    pub async fn run(
        &self,
        state: &mut ContextState,
        parameters: Value,
    ) -> Result<Value, ActionError> {
        self.handler.run(state, parameters).await
    }
}

/// Builder for [`Action`], in the crate's usual builder idiom.
pub struct ActionBuilder {
    id: String,
    description: String,
    parameters: Option<Value>,
    additional_instructions: Option<String>,
    depends_on: Vec<String>,
    retries: u32,
    handler: Option<Arc<dyn ActionHandler>>,
}

impl ActionBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            parameters: None,
            additional_instructions: None,
            depends_on: Vec::new(),
            retries: DEFAULT_RETRIES,
            handler: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// JSON Schema describing the action's parameters.
    pub fn parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }

    pub fn additional_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Synchronous body. For async bodies implement [`ActionHandler`]
    /// and use [`ActionBuilder::handler_arc`].
    pub fn handler<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut ContextState, Value) -> Result<Value, ActionError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(FnHandler(body)));
        self
    }

    pub fn handler_arc(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self) -> crate::Result<Action> {
        let handler = self.handler.ok_or_else(|| {
            crate::Error::Config(format!("action '{}' has no handler", self.id))
        })?;
        Ok(Action {
            id: self.id,
            description: self.description,
            parameters: self.parameters,
            additional_instructions: self.additional_instructions,
            depends_on: self.depends_on,
            retries: self.retries,
            handler,
        })
    }
}
