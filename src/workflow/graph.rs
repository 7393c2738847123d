// SPDX-License-Identifier: MIT

//! Workflow graph model
//!
//! A [`WorkflowGraph`] is the definition of a state machine: steps keyed by
//! name, transitions between them, an initial step and the schemas bound to
//! the workflow. It is never mutated in place. Every edit returns a new
//! graph, and an edit that is invalid or changes nothing returns an
//! unchanged copy instead of an error, so an editor can call these
//! speculatively.

use std::collections::BTreeMap;

use super::types::{Step, StepUpdate, Transition, TransitionUpdate, TransitionView};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowGraph {
    pub(crate) id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) initial: Option<String>,
    pub(crate) schema_ids: Vec<String>,
    /// Keyed by step name, so iteration yields display order
    pub(crate) steps: BTreeMap<String, Step>,
    /// Kept ordered by `(from, to)`
    pub(crate) transitions: Vec<Transition>,
    pub(crate) can_update: bool,
    pub(crate) can_delete: bool,
}

impl WorkflowGraph {
    /// An empty workflow that has not been created on the server yet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..self.clone()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn initial(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    pub fn schema_ids(&self) -> &[String] {
        &self.schema_ids
    }

    /// Steps in display order (by name)
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// All transitions, ordered by source then target
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn can_update(&self) -> bool {
        self.can_update
    }

    pub fn can_delete(&self) -> bool {
        self.can_delete
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_step(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    fn has_transition(&self, from: &str, to: &str) -> bool {
        self.transitions.iter().any(|t| t.connects(from, to))
    }

    /// Steps that `step` could still get a new transition to
    pub fn get_open_steps(&self, step: &Step) -> Vec<&Step> {
        self.steps
            .values()
            .filter(|candidate| candidate.name != step.name)
            .filter(|candidate| !self.has_transition(&step.name, &candidate.name))
            .collect()
    }

    /// Outgoing transitions of `step`, ordered by target name
    pub fn get_transitions(&self, step: &Step) -> Vec<TransitionView<'_>> {
        self.transitions
            .iter()
            .filter(|t| t.from == step.name)
            .map(|transition| TransitionView {
                transition,
                step: self.get_step(&transition.to),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Update the step called `name`, or add it if missing. The first step
    /// added becomes the initial step.
    pub fn set_step(&self, name: &str, values: &StepUpdate) -> Self {
        if name.is_empty() {
            return self.clone();
        }

        let mut steps = self.steps.clone();
        let step = match steps.get(name) {
            Some(existing) => existing.with_values(values),
            None => Step::new(name).with_values(values),
        };
        steps.insert(name.to_string(), step);

        let initial = if steps.len() == 1 {
            Some(name.to_string())
        } else {
            self.initial.clone()
        };

        Self {
            steps,
            initial,
            ..self.clone()
        }
    }

    /// Insert or update the transition `from -> to`. Both steps must exist
    /// and be distinct.
    pub fn set_transition(&self, from: &str, to: &str, values: &TransitionUpdate) -> Self {
        if from == to || self.get_step(from).is_none() || self.get_step(to).is_none() {
            return self.clone();
        }

        let mut transitions = self.transitions.clone();
        match transitions.iter().position(|t| t.connects(from, to)) {
            Some(index) => {
                transitions[index] = transitions[index].with_values(values);
            }
            None => {
                let index = transitions
                    .partition_point(|t| (t.from.as_str(), t.to.as_str()) < (from, to));
                transitions.insert(index, Transition::new(from, to).with_values(values));
            }
        }

        Self {
            transitions,
            ..self.clone()
        }
    }

    pub fn remove_transition(&self, from: &str, to: &str) -> Self {
        if !self.has_transition(from, to) {
            return self.clone();
        }

        Self {
            transitions: self
                .transitions
                .iter()
                .filter(|t| !t.connects(from, to))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Point the initial step at `name` unless it is missing or locked
    pub fn set_initial(&self, name: &str) -> Self {
        match self.get_step(name) {
            Some(step) if !step.is_locked => Self {
                initial: Some(name.to_string()),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }

    /// Remove an unlocked step together with every transition touching it.
    /// If it was the initial step, the first remaining unlocked step takes
    /// its place.
    pub fn remove_step(&self, name: &str) -> Self {
        match self.get_step(name) {
            Some(step) if !step.is_locked => {}
            _ => return self.clone(),
        }

        let mut steps = self.steps.clone();
        steps.remove(name);

        let transitions = self
            .transitions
            .iter()
            .filter(|t| !t.touches(name))
            .cloned()
            .collect();

        let initial = if self.initial.as_deref() == Some(name) {
            steps
                .values()
                .find(|step| !step.is_locked)
                .map(|step| step.name.clone())
        } else {
            self.initial.clone()
        };

        Self {
            steps,
            transitions,
            initial,
            ..self.clone()
        }
    }

    /// Rename a step, rewriting transitions and the initial pointer.
    /// No-op when `old_name` is missing or `new_name` is empty or taken.
    pub fn rename_step(&self, old_name: &str, new_name: &str) -> Self {
        if old_name == new_name || new_name.is_empty() || self.get_step(new_name).is_some() {
            return self.clone();
        }

        let mut steps = self.steps.clone();
        let Some(step) = steps.remove(old_name) else {
            return self.clone();
        };
        steps.insert(
            new_name.to_string(),
            Step {
                name: new_name.to_string(),
                ..step
            },
        );

        let rewrite = |name: &String| {
            if name == old_name {
                new_name.to_string()
            } else {
                name.clone()
            }
        };

        let mut transitions: Vec<Transition> = self
            .transitions
            .iter()
            .map(|t| Transition {
                from: rewrite(&t.from),
                to: rewrite(&t.to),
                ..t.clone()
            })
            .collect();
        transitions.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        Self {
            steps,
            transitions,
            initial: self.initial.as_ref().map(rewrite),
            ..self.clone()
        }
    }

    pub fn change_schema_ids(&self, ids: Vec<String>) -> Self {
        Self {
            schema_ids: ids,
            ..self.clone()
        }
    }

    /// Rename the workflow itself
    pub fn rename(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }
}
