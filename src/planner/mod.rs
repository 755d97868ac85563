//! The three planner roles and their shared machinery.
//!
//! An interaction runs through three phases, each owned by one role:
//! [`NextActionPlanner`] chooses which ready actions to run,
//! [`ParameterPlanner`] derives and validates one action's arguments, and
//! [`ResponsePlanner`] formats the final answer. Each role composes a
//! [`PlannerCore`] for prompt-state formatting and per-role cost
//! accounting; the loop reads accounting off the [`PlannerOutcome`] each
//! call returns.

mod core;
mod next_action;
mod parameters;
pub mod prompts;
mod response;
mod schema;
mod schemas;

pub use self::core::{CostLedger, PlannerCore, PlannerOutcome};
pub use next_action::NextActionPlanner;
pub use parameters::ParameterPlanner;
pub use response::ResponsePlanner;
pub use schema::CompiledSchema;
pub use schemas::{PlannedActions, PlannedParameters, PlannedResponse, parameters_schema, schema_of};
