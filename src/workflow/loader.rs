// SPDX-License-Identifier: MIT

//! Workflow loader - JSON/YAML file loading and saving
//!
//! Files hold the wire shape. The format is picked from the extension.

use std::fs;
use std::path::Path;

use super::collection::{parse_workflows, WireWorkflows, WorkflowsCollection};
use super::edit::WorkflowEdit;
use super::graph::WorkflowGraph;
use super::wire::{parse_workflow, WireWorkflow};
use crate::config::DecodeOptions;
use crate::error::FlowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, FlowError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(FlowError::unsupported_format(path.display().to_string())),
        }
    }
}

/// Loads and stores workflow files
pub struct WorkflowLoader {
    options: DecodeOptions,
}

impl WorkflowLoader {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    /// Parse a wire workflow from a JSON string
    pub fn parse_json(content: &str) -> Result<WireWorkflow, FlowError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a wire workflow from a YAML string
    pub fn parse_yaml(content: &str) -> Result<WireWorkflow, FlowError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load and decode a single workflow
    pub fn load_workflow<P: AsRef<Path>>(&self, path: P) -> Result<WorkflowGraph, FlowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let wire = match FileFormat::from_path(path)? {
            FileFormat::Json => Self::parse_json(&content)?,
            FileFormat::Yaml => Self::parse_yaml(&content)?,
        };

        log::debug!("Loaded workflow from {}", path.display());
        Ok(parse_workflow(&wire, &self.options)?)
    }

    /// Load and decode a workflow list payload
    pub fn load_collection<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<WorkflowsCollection, FlowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let wire: WireWorkflows = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
        };

        log::debug!(
            "Loaded {} workflows from {}",
            wire.items.len(),
            path.display()
        );
        Ok(parse_workflows(&wire, &self.options)?)
    }

    /// Load an edit script
    pub fn load_edits<P: AsRef<Path>>(&self, path: P) -> Result<Vec<WorkflowEdit>, FlowError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let edits: Vec<WorkflowEdit> = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
        };

        if edits.is_empty() {
            log::warn!("Edit script {} contains no edits", path.display());
        }
        Ok(edits)
    }

    /// Write a workflow, keeping its id so the file can be loaded again
    pub fn save_workflow<P: AsRef<Path>>(
        &self,
        path: P,
        graph: &WorkflowGraph,
    ) -> Result<(), FlowError> {
        let path = path.as_ref();
        let document = graph.to_document();
        let content = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::to_string_pretty(&document)?,
            FileFormat::Yaml => serde_yaml::to_string(&document)?,
        };

        fs::write(path, content)?;
        log::debug!("Saved workflow to {}", path.display());
        Ok(())
    }
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}
