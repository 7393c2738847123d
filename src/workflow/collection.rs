// SPDX-License-Identifier: MIT

//! Decoding the list of workflows configured for an app

use serde::{Deserialize, Serialize};

use super::graph::WorkflowGraph;
use super::wire::{parse_workflow, Links, WireWorkflow};
use crate::config::DecodeOptions;
use crate::error::DecodeError;

/// List payload as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WireWorkflows {
    pub items: Vec<WireWorkflow>,
    /// Validation messages about the workflow setup as a whole
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// All workflows of an app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowsCollection {
    /// Passed through as-is from the server
    pub errors: Vec<String>,
    pub items: Vec<WorkflowGraph>,
    pub can_create: bool,
}

impl WorkflowsCollection {
    pub fn find(&self, id: &str) -> Option<&WorkflowGraph> {
        self.items.iter().find(|item| item.id() == Some(id))
    }
}

/// Decode every item; fails on the first invalid workflow
pub fn parse_workflows(
    wire: &WireWorkflows,
    options: &DecodeOptions,
) -> Result<WorkflowsCollection, DecodeError> {
    let items = wire
        .items
        .iter()
        .map(|item| parse_workflow(item, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WorkflowsCollection {
        errors: wire.errors.clone(),
        items,
        can_create: wire.links.has_link("create"),
    })
}
