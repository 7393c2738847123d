// SPDX-License-Identifier: MIT

//! Step and transition records
//!
//! Plain value types. All behavior lives on
//! [`WorkflowGraph`](super::graph::WorkflowGraph).

use serde::{Deserialize, Serialize};

/// A named state in a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Unique within its workflow
    pub name: String,
    pub color: Option<String>,
    /// Locked steps cannot be removed or made initial
    pub is_locked: bool,
    /// Content in this step cannot be updated
    pub no_update: Option<bool>,
    /// Guard deciding when `no_update` applies
    pub no_update_expression: Option<String>,
    /// Roles `no_update` applies to
    pub no_update_roles: Option<Vec<String>>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Copy of this step with every `Some` field of `values` applied
    pub fn with_values(&self, values: &StepUpdate) -> Self {
        Self {
            name: self.name.clone(),
            color: values.color.clone().or_else(|| self.color.clone()),
            is_locked: values.is_locked.unwrap_or(self.is_locked),
            no_update: values.no_update.or(self.no_update),
            no_update_expression: values
                .no_update_expression
                .clone()
                .or_else(|| self.no_update_expression.clone()),
            no_update_roles: values
                .no_update_roles
                .clone()
                .or_else(|| self.no_update_roles.clone()),
        }
    }
}

/// A directed edge between two steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
    /// Opaque guard text, evaluated elsewhere
    pub expression: Option<String>,
    /// Roles allowed to take this transition
    pub roles: Option<Vec<String>>,
}

impl Transition {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            expression: None,
            roles: None,
        }
    }

    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }

    pub fn touches(&self, step_name: &str) -> bool {
        self.from == step_name || self.to == step_name
    }

    pub fn with_values(&self, values: &TransitionUpdate) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            expression: values
                .expression
                .clone()
                .or_else(|| self.expression.clone()),
            roles: values.roles.clone().or_else(|| self.roles.clone()),
        }
    }
}

/// Partial step values for `set_step`; `None` keeps the existing value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_update: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_update_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_update_roles: Option<Vec<String>>,
}

impl StepUpdate {
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn locked(mut self, is_locked: bool) -> Self {
        self.is_locked = Some(is_locked);
        self
    }
}

/// Partial transition values for `set_transition`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransitionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl TransitionUpdate {
    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = Some(roles.into_iter().map(Into::into).collect());
        self
    }
}

/// A transition paired with its resolved target step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionView<'a> {
    pub transition: &'a Transition,
    /// `None` only if the target went missing, which the mutation API prevents
    pub step: Option<&'a Step>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_with_values_keeps_name() {
        let step = Step {
            color: Some("#ff0000".to_string()),
            ..Step::new("Draft")
        };
        let updated = step.with_values(&StepUpdate::default().locked(true));

        assert_eq!(updated.name, "Draft");
        assert!(updated.is_locked);
        assert_eq!(updated.color, Some("#ff0000".to_string()));
    }

    #[test]
    fn test_step_with_values_overwrites_some_fields() {
        let step = Step::new("Review");
        let updated = step.with_values(&StepUpdate {
            no_update: Some(true),
            no_update_roles: Some(vec!["Editor".to_string()]),
            ..Default::default()
        });

        assert_eq!(updated.no_update, Some(true));
        assert_eq!(updated.no_update_roles, Some(vec!["Editor".to_string()]));
        assert!(!updated.is_locked);
    }

    #[test]
    fn test_transition_matching() {
        let transition = Transition::new("Draft", "Review");
        assert!(transition.connects("Draft", "Review"));
        assert!(!transition.connects("Review", "Draft"));
        assert!(transition.touches("Review"));
        assert!(!transition.touches("Published"));
    }

    #[test]
    fn test_transition_update_builder() {
        let values = TransitionUpdate::default()
            .expression("data.approved === true")
            .roles(["Editor", "Owner"]);
        let transition = Transition::new("Review", "Published").with_values(&values);

        assert_eq!(
            transition.expression,
            Some("data.approved === true".to_string())
        );
        assert_eq!(
            transition.roles,
            Some(vec!["Editor".to_string(), "Owner".to_string()])
        );
    }

    #[test]
    fn test_step_update_deserialize_camel_case() {
        let yaml = r##"
            color: "#00ff00"
            isLocked: true
            noUpdateExpression: "ctx.user.role != 'Admin'"
        "##;
        let values: StepUpdate = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(values.color, Some("#00ff00".to_string()));
        assert_eq!(values.is_locked, Some(true));
        assert_eq!(
            values.no_update_expression,
            Some("ctx.user.role != 'Admin'".to_string())
        );
        assert!(values.no_update.is_none());
    }
}
