//! Agent configuration.

use serde_json::Value;

/// Default ceiling on planning rounds per interaction.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Shape of the final response.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseFormat {
    /// Plain text summary.
    #[default]
    Text,
    /// JSON conforming to the given schema.
    Json(Value),
}

/// Static configuration of an agent, fixed at build time.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System instructions prefixed to every planner prompt.
    pub instructions: String,
    /// Hard ceiling on planning rounds per interaction. When reached, the
    /// loop stops planning and formats a response from whatever state
    /// exists.
    pub max_rounds: u32,
    pub response_format: ResponseFormat,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instructions: String::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            response_format: ResponseFormat::default(),
        }
    }
}
