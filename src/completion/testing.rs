//! Deterministic completion provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{Completion, CompletionProvider, CompletionRequest};

/// Replays a fixed script of completion contents, one per `complete` call,
/// with constant token and cost figures. Running past the end of the script
/// is an error, so tests fail loudly when the loop makes an unexpected call.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Value>>,
    calls: AtomicUsize,
    input_tokens: u32,
    output_tokens: u32,
    cost_cents: Decimal,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Value>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            input_tokens: 100,
            output_tokens: 20,
            cost_cents: Decimal::new(5, 1), // 0.5 cents per call
        }
    }

    pub fn with_cost(mut self, cost_cents: Decimal) -> Self {
        self.cost_cents = cost_cents;
        self
    }

    pub fn with_tokens(mut self, input: u32, output: u32) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Cost per call, for asserting accounting totals.
    pub fn cost_per_call(&self) -> Decimal {
        self.cost_cents
    }

    /// Completions left in the script.
    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock").len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> crate::Result<Completion> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let content = self
            .script
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| {
                crate::Error::Completion(format!(
                    "scripted provider exhausted (prompt started: {:.60})",
                    request.prompt.replace('\n', " ")
                ))
            })?;
        Ok(Completion {
            raw_output: content.to_string(),
            content,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cost_cents: self.cost_cents,
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Provider that loops the same content forever. Used to verify the round
/// ceiling terminates the interaction no matter what the planner proposes.
pub struct RepeatingProvider {
    content: Value,
    calls: AtomicUsize,
}

impl RepeatingProvider {
    pub fn new(content: Value) -> Self {
        Self {
            content,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl CompletionProvider for RepeatingProvider {
    async fn complete(&self, _request: CompletionRequest) -> crate::Result<Completion> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(Completion {
            content: self.content.clone(),
            input_tokens: 10,
            output_tokens: 5,
            cost_cents: Decimal::ZERO,
            raw_output: self.content.to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "repeating"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_provider_replays_in_order() {
        let provider = ScriptedProvider::new(vec![json!({"a": 1}), json!({"b": 2})]);

        let first = provider
            .complete(CompletionRequest::new("p", json!({})))
            .await
            .unwrap();
        assert_eq!(first.content, json!({"a": 1}));

        let second = provider
            .complete(CompletionRequest::new("p", json!({})))
            .await
            .unwrap();
        assert_eq!(second.content, json!({"b": 2}));
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_scripted_provider_errors_when_exhausted() {
        let provider = ScriptedProvider::new(vec![]);
        let err = provider
            .complete(CompletionRequest::new("p", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Completion(_)));
    }
}
