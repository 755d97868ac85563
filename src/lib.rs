//! Action-orchestration engine for LLM-planned workflows.
//!
//! An [`Agent`] owns a registry of [`Action`]s and a [`CompletionProvider`]
//! (the reasoning service). Each interaction runs a three-phase loop: a
//! planner chooses which ready actions to run, derives schema-validated
//! parameters for each, executes them against a shared [`ContextState`],
//! and finally formats a truthful response from the execution record.
//! Failed actions are retried under per-action budgets, every planner call
//! is cost-accounted in fractional cents, and a round ceiling guarantees
//! termination.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use action_agent::{Action, Agent};
//! use serde_json::json;
//!
//! # async fn example(provider: Arc<dyn action_agent::CompletionProvider>) -> action_agent::Result<()> {
//! let sum = Action::builder("sum")
//!     .description("Adds two numbers")
//!     .parameters(json!({
//!         "type": "object",
//!         "properties": {
//!             "a": {"type": "number"},
//!             "b": {"type": "number"}
//!         },
//!         "required": ["a", "b"]
//!     }))
//!     .handler(|state, params| {
//!         let total = params["a"].as_f64().unwrap_or(0.0) + params["b"].as_f64().unwrap_or(0.0);
//!         state.set("sum", total);
//!         Ok(json!(total))
//!     })
//!     .build()?;
//!
//! let agent = Agent::builder()
//!     .instructions("You are a calculator assistant.")
//!     .action(sum)
//!     .provider(provider)
//!     .build()
//!     .await?;
//!
//! let result = agent.run("What is 10 plus 5?").await?;
//! println!("{}", result.response_text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod agent;
pub mod completion;
pub mod engine;
pub mod observability;
pub mod planner;

pub use actions::{
    Action, ActionBuilder, ActionError, ActionHandler, ActionRegistry, ActionSource,
    DEFAULT_RETRIES, StaticSource,
};
pub use agent::{
    ActionStatus, Agent, AgentBuilder, AgentConfig, ContextState, DEFAULT_MAX_ROUNDS,
    ExecutedAction, InteractionMetrics, InteractionResult, InteractionState, ResponseFormat,
};
pub use completion::{Completion, CompletionProvider, CompletionRequest};
pub use engine::ExecutionEngine;
pub use observability::{CollectingSink, EventSink, Phase, PhaseEvent, PhaseStatus, TracingSink};
pub use planner::{
    NextActionPlanner, ParameterPlanner, PlannedActions, PlannedParameters, PlannedResponse,
    PlannerOutcome, ResponsePlanner,
};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way the engine can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two registered actions share an id.
    #[error("duplicate action id: {0}")]
    DuplicateActionId(String),

    /// An action's parameter schema failed to compile.
    #[error("parameter schema of action '{action}' failed to compile: {message}")]
    SchemaCompile { action: String, message: String },

    /// Parameter planning was requested for an action without a schema.
    #[error("action '{0}' has no parameter schema")]
    MissingParameterSchema(String),

    /// The reasoning service returned content outside the planner protocol.
    #[error("invalid planner output: {0}")]
    InvalidPlannerOutput(String),

    /// Planned parameters failed validation against the action's schema.
    #[error("parameters for action '{action}' failed validation: {message}")]
    ParameterValidation { action: String, message: String },

    /// The completion provider failed.
    #[error("completion failed: {0}")]
    Completion(String),

    /// Invalid agent or action configuration.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error class, used by the loop to decide between rerunning a
/// round and aborting the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Wrong registration or agent setup; fix the code, not the prompt.
    Configuration,
    /// The reasoning service violated the planner protocol; worth
    /// re-asking.
    PlannerProtocol,
    /// The provider call itself failed.
    Transient,
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateActionId(_)
            | Self::SchemaCompile { .. }
            | Self::MissingParameterSchema(_)
            | Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidPlannerOutput(_) | Self::ParameterValidation { .. } => {
                ErrorCategory::PlannerProtocol
            }
            Self::Completion(_) => ErrorCategory::Transient,
            Self::Json(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Whether re-asking the planner could produce a different outcome.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::PlannerProtocol
    }
}
