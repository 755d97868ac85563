//! Dynamically discovered action sources.
//!
//! Mirrors how ready-made action definitions arrive from an external tool
//! registry (a subprocess-based catalog, a plugin host, a remote manifest).
//! Loading happens before an interaction starts; failures here are
//! configuration-time errors, never interaction-time ones.

use async_trait::async_trait;

use super::Action;

/// A provider of ready-made action definitions.
#[async_trait]
pub trait ActionSource: Send + Sync {
    async fn load(&self) -> crate::Result<Vec<Action>>;

    /// Human-readable source name for diagnostics.
    fn name(&self) -> &str {
        "external"
    }
}

/// In-memory source, useful for tests and for adapting actions that were
/// discovered by other means.
pub struct StaticSource {
    name: String,
    actions: Vec<Action>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }
}

#[async_trait]
impl ActionSource for StaticSource {
    async fn load(&self) -> crate::Result<Vec<Action>> {
        Ok(self.actions.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Load every source in order, flattening the results. The first failing
/// source aborts the load; partial registries are worse than none.
pub async fn load_sources(sources: &[Box<dyn ActionSource>]) -> crate::Result<Vec<Action>> {
    let mut actions = Vec::new();
    for source in sources {
        let mut loaded = source.load().await.map_err(|e| {
            crate::Error::Config(format!("action source '{}' failed: {}", source.name(), e))
        })?;
        tracing::debug!(source = source.name(), count = loaded.len(), "Loaded external actions");
        actions.append(&mut loaded);
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn action(id: &str) -> Action {
        Action::builder(id)
            .handler(|_, _| Ok(Value::Null))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_sources_flattens_in_order() {
        let sources: Vec<Box<dyn ActionSource>> = vec![
            Box::new(StaticSource::new("a", vec![action("one")])),
            Box::new(StaticSource::new("b", vec![action("two"), action("three")])),
        ];

        let actions = load_sources(&sources).await.unwrap();
        let ids: Vec<_> = actions.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["one", "two", "three"]);
    }
}
