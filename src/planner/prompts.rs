//! Prompt templates for the three planner roles.
//!
//! Templates use `{{variable}}` placeholders substituted by [`render`].
//! Wording is deliberately provider-neutral; the response schema, not the
//! prose, is what constrains the output shape.

pub const PLAN_NEXT_ACTIONS_PROMPT: &str = "\
{{instructions}}

You decide which of the available actions to run next, if any, to make
progress on the user's request. Choose only from the available actions
listed below, and return them in the exact order they should execute.
Return an empty list when the request is fully handled by the actions
already executed.

User request:
{{input}}

Available actions:
{{available_actions}}

Current context state:
{{context}}

Actions executed this interaction:
{{executed_actions}}

Actions from previous interactions:
{{previous_actions}}";

pub const PLAN_NEXT_ACTIONS_RERUN_PROMPT: &str = "\
{{instructions}}

A previous round of this interaction failed or produced an invalid plan.
Review the execution history below, explain in your reasoning what went
wrong and what you are changing, then choose the next actions to run.
Choose only from the available actions listed below, in execution order.
Do not choose an action that keeps failing for the same cause; return an
empty list if no action can make further progress.

User request:
{{input}}

Available actions:
{{available_actions}}

Current context state:
{{context}}

Actions executed this interaction (including failures):
{{executed_actions}}

Actions from previous interactions:
{{previous_actions}}";

pub const GET_ACTION_PARAMETERS_PROMPT: &str = "\
{{instructions}}

Produce the parameters for the action \"{{action}}\".

Action description:
{{action_description}}
{{additional_instructions}}
The parameters must conform to this JSON Schema:
{{parameter_schema}}

Derive concrete values from the user request and the current state below.
Use values already present in the context state when a parameter should
carry forward a previous action's output.

Current state:
{{planner_state}}";

pub const FORMAT_RESPONSE_PROMPT: &str = "\
{{instructions}}

Write the final response to the user. The execution history below is the
complete and truthful record of this interaction: report what succeeded,
what failed after retries, and what was not attempted. Do not claim an
action succeeded unless its status is \"success\".

{{response_format}}

User request:
{{input}}

Final state:
{{planner_state}}";

/// Substitute `{{name}}` placeholders. Unknown placeholders are left
/// untouched so a missing variable is visible in the rendered prompt.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{{{}}}}}", name), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let out = render("{{a}} and {{b}} and {{a}}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let out = render("{{known}} {{unknown}}", &[("known", "v")]);
        assert_eq!(out, "v {{unknown}}");
    }

    #[test]
    fn test_templates_share_variable_names() {
        for template in [
            PLAN_NEXT_ACTIONS_PROMPT,
            PLAN_NEXT_ACTIONS_RERUN_PROMPT,
        ] {
            for var in [
                "{{instructions}}",
                "{{input}}",
                "{{available_actions}}",
                "{{context}}",
                "{{executed_actions}}",
                "{{previous_actions}}",
            ] {
                assert!(template.contains(var), "missing {} in template", var);
            }
        }
    }
}
