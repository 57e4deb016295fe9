//! Plan modifiers
//!
//! Plan modifiers run after Terraform has produced a proposed new state and
//! can adjust the planned value, mark an attribute as requiring replacement,
//! or add diagnostics.

use crate::types::{Diagnostics, Dynamic};

#[derive(Debug, Clone)]
pub struct PlanModifyRequest {
    pub state: Dynamic,
    pub plan: Dynamic,
    pub config: Dynamic,
    pub attribute_path: String,
}

#[derive(Debug, Clone)]
pub struct PlanModifyResponse {
    pub plan_value: Dynamic,
    pub requires_replace: bool,
    pub diagnostics: Diagnostics,
}

pub trait PlanModifier: Send + Sync {
    /// Modify the plan for an attribute
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse;
}

/// Marks an attribute as requiring replacement when its value changes
pub struct RequiresReplaceIfChanged;

impl PlanModifier for RequiresReplaceIfChanged {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let requires_replace = !matches!(
            (&request.state, &request.plan),
            (Dynamic::Null, Dynamic::Null) | (Dynamic::Unknown, _) | (_, Dynamic::Unknown)
        ) && !values_equal(&request.state, &request.plan);

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics: Diagnostics::new(),
        }
    }
}

/// Uses the current state value when the planned value is unknown
///
/// Useful for computed attributes that keep their value across updates, so
/// plans don't show them as "(known after apply)".
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plan_value = match &request.plan {
            // Unknown may be decoded as Null due to msgpack limitations
            Dynamic::Unknown | Dynamic::Null => match &request.state {
                Dynamic::Null => request.plan,
                _ => request.state.clone(),
            },
            _ => request.plan,
        };

        PlanModifyResponse {
            plan_value,
            requires_replace: false,
            diagnostics: Diagnostics::new(),
        }
    }
}

/// Requires replacement when the given predicate matches
pub struct RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    predicate: F,
    description: String,
}

impl<F> RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    pub fn new(predicate: F, description: impl Into<String>) -> Self {
        Self {
            predicate,
            description: description.into(),
        }
    }
}

impl<F> PlanModifier for RequiresReplaceIf<F>
where
    F: Fn(&PlanModifyRequest) -> bool + Send + Sync,
{
    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let mut diagnostics = Diagnostics::new();
        let requires_replace = (self.predicate)(&request);

        if requires_replace {
            diagnostics.add_warning(
                format!(
                    "Attribute '{}' requires resource replacement",
                    request.attribute_path
                ),
                Some(&self.description),
            );
        }

        PlanModifyResponse {
            plan_value: request.plan,
            requires_replace,
            diagnostics,
        }
    }
}

/// Compare two Dynamic values for equality
pub(crate) fn values_equal(a: &Dynamic, b: &Dynamic) -> bool {
    match (a, b) {
        (Dynamic::Null, Dynamic::Null) => true,
        (Dynamic::Bool(a), Dynamic::Bool(b)) => a == b,
        (Dynamic::Number(a), Dynamic::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Dynamic::String(a), Dynamic::String(b)) => a == b,
        (Dynamic::List(a), Dynamic::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Dynamic::Map(a), Dynamic::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|v2| values_equal(v, v2)))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(state: Dynamic, plan: Dynamic) -> PlanModifyRequest {
        PlanModifyRequest {
            state,
            plan: plan.clone(),
            config: plan,
            attribute_path: "attr".to_string(),
        }
    }

    #[test]
    fn requires_replace_if_changed_ignores_equal_values() {
        let response = RequiresReplaceIfChanged.modify_plan(request(
            Dynamic::String("net-1".to_string()),
            Dynamic::String("net-1".to_string()),
        ));

        assert!(!response.requires_replace);
    }

    #[test]
    fn requires_replace_if_changed_triggers_on_change() {
        let response = RequiresReplaceIfChanged.modify_plan(request(
            Dynamic::String("net-1".to_string()),
            Dynamic::String("net-2".to_string()),
        ));

        assert!(response.requires_replace);
    }

    #[test]
    fn requires_replace_if_changed_skips_unknown_plan() {
        let response = RequiresReplaceIfChanged.modify_plan(request(
            Dynamic::String("net-1".to_string()),
            Dynamic::Unknown,
        ));

        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_keeps_known_plan() {
        let response = UseStateForUnknown.modify_plan(request(
            Dynamic::String("old".to_string()),
            Dynamic::String("new".to_string()),
        ));

        assert_eq!(response.plan_value, Dynamic::String("new".to_string()));
    }

    #[test]
    fn use_state_for_unknown_substitutes_state() {
        let response = UseStateForUnknown.modify_plan(request(
            Dynamic::String("keep-me".to_string()),
            Dynamic::Unknown,
        ));

        assert_eq!(response.plan_value, Dynamic::String("keep-me".to_string()));
    }

    #[test]
    fn requires_replace_if_runs_predicate() {
        let modifier = RequiresReplaceIf::new(
            |req| req.plan.as_string().is_some_and(|s| s == "force"),
            "forced replacement",
        );

        let triggered = modifier.modify_plan(request(
            Dynamic::String("x".to_string()),
            Dynamic::String("force".to_string()),
        ));
        assert!(triggered.requires_replace);
        assert_eq!(triggered.diagnostics.warnings.len(), 1);

        let skipped = modifier.modify_plan(request(
            Dynamic::String("x".to_string()),
            Dynamic::String("y".to_string()),
        ));
        assert!(!skipped.requires_replace);
    }
}
