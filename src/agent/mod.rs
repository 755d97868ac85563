//! Agent construction and the interaction loop.

mod config;
mod events;
mod execution;
mod executor;
mod options;
mod state;

pub use config::{AgentConfig, DEFAULT_MAX_ROUNDS, ResponseFormat};
pub use events::{InteractionMetrics, InteractionResult};
pub use executor::Agent;
pub use options::AgentBuilder;
pub use state::{ActionStatus, ContextState, ExecutedAction, InteractionState};
