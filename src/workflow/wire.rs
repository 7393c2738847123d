// SPDX-License-Identifier: MIT

//! Wire codec
//!
//! The transport shape nests transitions inside their source step and keys
//! both levels by name:
//!
//! ```json
//! {
//!   "id": "...", "name": "Default", "initial": "Draft", "schemaIds": [],
//!   "steps": {
//!     "Draft": { "color": "#888", "transitions": { "Review": { "roles": ["Editor"] } } },
//!     "Review": { "transitions": {} }
//!   },
//!   "_links": { "update": { "method": "PUT", "href": "/workflows/..." } }
//! }
//! ```
//!
//! [`parse_workflow`] flattens this into a [`WorkflowGraph`] and
//! [`WorkflowGraph::encode`] nests it back.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use super::graph::WorkflowGraph;
use super::types::{Step, Transition};
use crate::config::DecodeOptions;
use crate::error::DecodeError;

/// A workflow as exchanged with the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkflow {
    /// Absent in outbound payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub initial: Option<String>,
    #[serde(default)]
    pub schema_ids: Vec<String>,
    #[serde(deserialize_with = "unique_keys")]
    pub steps: BTreeMap<String, WireStep>,
    /// Absent in outbound payloads
    #[serde(rename = "_links", default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

/// A step with its outgoing transitions keyed by target name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStep {
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
    #[serde(default, deserialize_with = "unique_keys")]
    pub transitions: BTreeMap<String, WireTransition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WireTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// Hypermedia links advertised by the server, keyed by relation
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Links(BTreeMap<String, Link>);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Link {
    pub method: String,
    pub href: String,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        rel: impl Into<String>,
        method: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        self.0.insert(
            rel.into(),
            Link {
                method: method.into(),
                href: href.into(),
            },
        );
        self
    }

    pub fn has_link(&self, rel: &str) -> bool {
        self.0.contains_key(rel)
    }

    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.get(rel)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Name-keyed maps where a repeated key is an error instead of last-wins
fn unique_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = BTreeMap<String, V>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                match map.entry(key) {
                    Entry::Occupied(entry) => {
                        return Err(de::Error::custom(format!(
                            "duplicate key '{}'",
                            entry.key()
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(value);
                    }
                }
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueKeys(PhantomData))
}

/// Decode a wire workflow, checking that every name it references exists
pub fn parse_workflow(
    wire: &WireWorkflow,
    options: &DecodeOptions,
) -> Result<WorkflowGraph, DecodeError> {
    let mut steps = BTreeMap::new();
    let mut transitions = Vec::new();

    for (name, wire_step) in &wire.steps {
        if name.is_empty() {
            return Err(DecodeError::EmptyStepName);
        }

        for (target, wire_transition) in &wire_step.transitions {
            if target == name {
                return Err(DecodeError::SelfTransition { step: name.clone() });
            }
            if !wire.steps.contains_key(target) {
                return Err(DecodeError::UnknownTransitionTarget {
                    from: name.clone(),
                    to: target.clone(),
                });
            }

            transitions.push(Transition {
                from: name.clone(),
                to: target.clone(),
                expression: wire_transition.expression.clone(),
                roles: wire_transition.roles.clone(),
            });
        }

        steps.insert(
            name.clone(),
            Step {
                name: name.clone(),
                color: wire_step.color.clone(),
                is_locked: wire_step.is_locked.unwrap_or(false)
                    || options.is_implicitly_locked(name),
                no_update: wire_step.no_update,
                no_update_expression: wire_step.no_update_expression.clone(),
                no_update_roles: wire_step.no_update_roles.clone(),
            },
        );
    }

    if let Some(initial) = &wire.initial {
        if !steps.contains_key(initial) {
            return Err(DecodeError::UnknownInitialStep(initial.clone()));
        }
    }

    log::debug!(
        "Decoded workflow {:?} with {} steps and {} transitions",
        wire.name,
        steps.len(),
        transitions.len()
    );

    Ok(WorkflowGraph {
        id: wire.id.clone(),
        name: wire.name.clone(),
        initial: wire.initial.clone(),
        schema_ids: wire.schema_ids.clone(),
        steps,
        transitions,
        can_update: wire.links.has_link("update"),
        can_delete: wire.links.has_link("delete"),
    })
}

impl WorkflowGraph {
    /// Outbound payload for saving: no `id`, no links
    pub fn encode(&self) -> WireWorkflow {
        let mut steps: BTreeMap<String, WireStep> = self
            .steps
            .values()
            .map(|step| {
                let wire_step = WireStep {
                    color: step.color.clone(),
                    is_locked: step.is_locked.then_some(true),
                    no_update: step.no_update,
                    no_update_expression: step.no_update_expression.clone(),
                    no_update_roles: step.no_update_roles.clone(),
                    transitions: BTreeMap::new(),
                };
                (step.name.clone(), wire_step)
            })
            .collect();

        for transition in &self.transitions {
            if let Some(source) = steps.get_mut(&transition.from) {
                source.transitions.insert(
                    transition.to.clone(),
                    WireTransition {
                        expression: transition.expression.clone(),
                        roles: transition.roles.clone(),
                    },
                );
            }
        }

        WireWorkflow {
            id: None,
            name: self.name.clone(),
            initial: self.initial.clone(),
            schema_ids: self.schema_ids.clone(),
            steps,
            links: Links::new(),
        }
    }

    /// Encoded payload that keeps the `id`, for storing a workflow locally
    pub fn to_document(&self) -> WireWorkflow {
        WireWorkflow {
            id: self.id.clone(),
            ..self.encode()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{StepUpdate, TransitionUpdate};
    use serde_json::json;

    fn wire(value: serde_json::Value) -> WireWorkflow {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> WireWorkflow {
        wire(json!({
            "id": "wf-1",
            "name": "Default",
            "initial": "Draft",
            "schemaIds": ["articles"],
            "steps": {
                "Draft": {
                    "color": "#8899aa",
                    "transitions": {
                        "Review": { "roles": ["Editor"] }
                    }
                },
                "Review": {
                    "noUpdate": true,
                    "noUpdateRoles": ["Author"],
                    "transitions": {
                        "Draft": {},
                        "Published": { "expression": "data.approved.iv === true" }
                    }
                },
                "Published": {
                    "isLocked": true,
                    "transitions": {}
                }
            },
            "_links": {
                "update": { "method": "PUT", "href": "/workflows/wf-1" }
            }
        }))
    }

    #[test]
    fn test_parse_workflow_flattens_steps() {
        let graph = parse_workflow(&sample(), &DecodeOptions::default()).unwrap();

        assert_eq!(graph.id(), Some("wf-1"));
        assert_eq!(graph.name(), Some("Default"));
        assert_eq!(graph.initial(), Some("Draft"));
        assert_eq!(graph.schema_ids(), ["articles"]);
        assert_eq!(graph.step_count(), 3);

        let draft = graph.get_step("Draft").unwrap();
        assert_eq!(draft.color, Some("#8899aa".to_string()));
        assert!(!draft.is_locked);

        let review = graph.get_step("Review").unwrap();
        assert_eq!(review.no_update, Some(true));
        assert_eq!(review.no_update_roles, Some(vec!["Author".to_string()]));

        assert!(graph.get_step("Published").unwrap().is_locked);
    }

    #[test]
    fn test_parse_workflow_flattens_transitions() {
        let graph = parse_workflow(&sample(), &DecodeOptions::default()).unwrap();

        let edges: Vec<(&str, &str)> = graph
            .transitions()
            .iter()
            .map(|t| (t.from.as_str(), t.to.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![("Draft", "Review"), ("Review", "Draft"), ("Review", "Published")]
        );

        let to_published = &graph.transitions()[2];
        assert_eq!(
            to_published.expression,
            Some("data.approved.iv === true".to_string())
        );
        assert_eq!(graph.transitions()[0].roles, Some(vec!["Editor".to_string()]));
    }

    #[test]
    fn test_capabilities_from_links() {
        let graph = parse_workflow(&sample(), &DecodeOptions::default()).unwrap();
        assert!(graph.can_update());
        assert!(!graph.can_delete());
    }

    #[test]
    fn test_implicit_lock_is_configurable() {
        let mut payload = sample();
        if let Some(step) = payload.steps.get_mut("Published") {
            step.is_locked = None;
        }

        let graph = parse_workflow(&payload, &DecodeOptions::default()).unwrap();
        assert!(!graph.get_step("Published").unwrap().is_locked);

        let graph = parse_workflow(&payload, &DecodeOptions::legacy()).unwrap();
        assert!(graph.get_step("Published").unwrap().is_locked);
    }

    #[test]
    fn test_unknown_target_rejected() {
        let payload = wire(json!({
            "id": "wf-2",
            "steps": {
                "Draft": { "transitions": { "Archive": {} } }
            }
        }));

        let err = parse_workflow(&payload, &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownTransitionTarget {
                from: "Draft".to_string(),
                to: "Archive".to_string()
            }
        );
    }

    #[test]
    fn test_self_transition_rejected() {
        let payload = wire(json!({
            "steps": {
                "Draft": { "transitions": { "Draft": {} } }
            }
        }));

        let err = parse_workflow(&payload, &DecodeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::SelfTransition {
                step: "Draft".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_initial_rejected() {
        let payload = wire(json!({
            "initial": "Draft",
            "steps": {}
        }));

        let err = parse_workflow(&payload, &DecodeOptions::default()).unwrap_err();
        assert_eq!(err, DecodeError::UnknownInitialStep("Draft".to_string()));
    }

    #[test]
    fn test_empty_step_name_rejected() {
        let payload = wire(json!({ "steps": { "": {} } }));

        let err = parse_workflow(&payload, &DecodeOptions::default()).unwrap_err();
        assert_eq!(err, DecodeError::EmptyStepName);
    }

    #[test]
    fn test_duplicate_step_key_rejected() {
        let payload = r#"{
            "steps": {
                "Draft": { "transitions": { "Review": {} } },
                "Review": { "transitions": {} },
                "Draft": { "transitions": {} }
            }
        }"#;

        let err = serde_json::from_str::<WireWorkflow>(payload).unwrap_err();
        assert!(err.to_string().contains("duplicate key 'Draft'"));
    }

    #[test]
    fn test_duplicate_transition_key_rejected() {
        let payload = r#"{
            "steps": {
                "Draft": { "transitions": { "Review": {}, "Review": { "roles": ["Editor"] } } },
                "Review": { "transitions": {} }
            }
        }"#;

        let err = serde_json::from_str::<WireWorkflow>(payload).unwrap_err();
        assert!(err.to_string().contains("duplicate key 'Review'"));
    }

    #[test]
    fn test_missing_steps_fails_to_deserialize() {
        let result = serde_json::from_value::<WireWorkflow>(json!({ "id": "wf-3" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_nests_transitions_and_drops_id() {
        let graph = parse_workflow(&sample(), &DecodeOptions::default()).unwrap();
        let encoded = serde_json::to_value(graph.encode()).unwrap();

        assert_eq!(
            encoded,
            json!({
                "name": "Default",
                "initial": "Draft",
                "schemaIds": ["articles"],
                "steps": {
                    "Draft": {
                        "color": "#8899aa",
                        "transitions": { "Review": { "roles": ["Editor"] } }
                    },
                    "Review": {
                        "noUpdate": true,
                        "noUpdateRoles": ["Author"],
                        "transitions": {
                            "Draft": {},
                            "Published": { "expression": "data.approved.iv === true" }
                        }
                    },
                    "Published": {
                        "isLocked": true,
                        "transitions": {}
                    }
                }
            })
        );
    }

    #[test]
    fn test_to_document_keeps_id() {
        let graph = parse_workflow(&sample(), &DecodeOptions::default()).unwrap();
        let document = graph.to_document();
        assert_eq!(document.id, Some("wf-1".to_string()));
        assert!(document.links.is_empty());
    }

    #[test]
    fn test_round_trip_built_graph() {
        let graph = WorkflowGraph::named("Editorial")
            .set_step("Draft", &StepUpdate::default().color("#ccc"))
            .set_step("Review", &StepUpdate::default())
            .set_step("Done", &StepUpdate::default().locked(true))
            .set_transition(
                "Draft",
                "Review",
                &TransitionUpdate::default().roles(["Author"]),
            )
            .set_transition(
                "Review",
                "Done",
                &TransitionUpdate::default().expression("data.ok"),
            )
            .set_transition("Review", "Draft", &TransitionUpdate::default())
            .change_schema_ids(vec!["news".to_string()]);

        let decoded = parse_workflow(&graph.encode(), &DecodeOptions::default()).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_links_builder() {
        let links = Links::new()
            .with("create", "POST", "/workflows")
            .with("delete", "DELETE", "/workflows/1");

        assert!(links.has_link("create"));
        assert!(!links.has_link("update"));
        assert_eq!(links.get("delete").unwrap().method, "DELETE");
    }
}
