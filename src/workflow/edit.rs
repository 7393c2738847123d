// SPDX-License-Identifier: MIT

//! Edit operations as data
//!
//! Each [`WorkflowEdit`] names one graph mutation, so an editing session can
//! be recorded, replayed or loaded from a script:
//!
//! ```yaml
//! - op: set_step
//!   name: Review
//!   color: "#3389ff"
//! - op: set_transition
//!   from: Draft
//!   to: Review
//!   roles: [Editor]
//! ```

use serde::{Deserialize, Serialize};

use super::graph::WorkflowGraph;
use super::types::{StepUpdate, TransitionUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WorkflowEdit {
    SetStep {
        name: String,
        #[serde(flatten)]
        values: StepUpdate,
    },
    SetTransition {
        from: String,
        to: String,
        #[serde(flatten)]
        values: TransitionUpdate,
    },
    RemoveTransition {
        from: String,
        to: String,
    },
    SetInitial {
        name: String,
    },
    RemoveStep {
        name: String,
    },
    RenameStep {
        old_name: String,
        new_name: String,
    },
    ChangeSchemaIds {
        ids: Vec<String>,
    },
    Rename {
        name: String,
    },
}

impl WorkflowGraph {
    /// Apply a single edit; invalid edits leave the graph unchanged
    pub fn apply(&self, edit: &WorkflowEdit) -> Self {
        match edit {
            WorkflowEdit::SetStep { name, values } => self.set_step(name, values),
            WorkflowEdit::SetTransition { from, to, values } => {
                self.set_transition(from, to, values)
            }
            WorkflowEdit::RemoveTransition { from, to } => self.remove_transition(from, to),
            WorkflowEdit::SetInitial { name } => self.set_initial(name),
            WorkflowEdit::RemoveStep { name } => self.remove_step(name),
            WorkflowEdit::RenameStep { old_name, new_name } => {
                self.rename_step(old_name, new_name)
            }
            WorkflowEdit::ChangeSchemaIds { ids } => self.change_schema_ids(ids.clone()),
            WorkflowEdit::Rename { name } => self.rename(name.clone()),
        }
    }

    pub fn apply_all<'a, I>(&self, edits: I) -> Self
    where
        I: IntoIterator<Item = &'a WorkflowEdit>,
    {
        edits
            .into_iter()
            .fold(self.clone(), |graph, edit| graph.apply(edit))
    }
}
