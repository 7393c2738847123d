// SPDX-License-Identifier: MIT

//! Workflow definitions: the step graph, its wire codec and file loading

pub mod collection;
pub mod edit;
pub mod graph;
pub mod loader;
pub mod types;
pub mod wire;

pub use collection::{parse_workflows, WireWorkflows, WorkflowsCollection};
pub use edit::WorkflowEdit;
pub use graph::WorkflowGraph;
pub use loader::{FileFormat, WorkflowLoader};
pub use types::{Step, StepUpdate, Transition, TransitionUpdate, TransitionView};
pub use wire::{parse_workflow, Link, Links, WireStep, WireTransition, WireWorkflow};
