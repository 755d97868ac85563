//! Action definitions, registry, and external sources.

mod action;
mod external;
mod registry;

pub use action::{Action, ActionBuilder, ActionError, ActionHandler, DEFAULT_RETRIES};
pub use external::{ActionSource, StaticSource, load_sources};
pub use registry::ActionRegistry;
