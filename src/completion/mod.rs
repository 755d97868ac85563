//! Reasoning-service capability.
//!
//! The core never talks to a model API directly; every planning decision
//! goes through [`CompletionProvider`], a single schema-constrained
//! `complete` call. Adapters for concrete providers live outside this crate.

pub mod testing;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

/// One schema-constrained completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully rendered prompt.
    pub prompt: String,
    /// JSON Schema the `content` of the response must conform to.
    pub schema: Value,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
        }
    }
}

/// Result of one completion call, with accounting figures.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Schema-conformant decoded content.
    pub content: Value,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Cost of this call in fractional cents.
    pub cost_cents: Decimal,
    /// Raw model output before decoding, kept for observability payloads.
    pub raw_output: String,
}

/// The external reasoning service.
///
/// Implementations must either decode against `request.schema` or validate
/// post-hoc; content that does not conform surfaces in the core as
/// [`crate::Error::InvalidPlannerOutput`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> crate::Result<Completion>;

    /// Model identifier, used only for observability payloads.
    fn model_name(&self) -> &str {
        "unknown"
    }
}
