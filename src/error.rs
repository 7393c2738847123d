// SPDX-License-Identifier: MIT

//! Typed error handling for approval-flow
//!
//! Graph mutations never fail; errors only come from the decode boundary
//! and from loading or saving workflow files.

use thiserror::Error;

/// Top-level error type for approval-flow
#[derive(Debug, Error)]
pub enum FlowError {
    /// Wire payload was well-formed but violated a graph invariant
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// File extension is not one we know how to read or write
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Configuration errors (invalid env vars)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Invariant violations found while decoding a wire workflow
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A step map key was the empty string
    #[error("Step name must not be empty")]
    EmptyStepName,

    /// A nested transition points at a step the payload does not define
    #[error("Transition {from} -> {to} targets an unknown step")]
    UnknownTransitionTarget { from: String, to: String },

    /// A transition from a step to itself
    #[error("Step '{step}' has a transition to itself")]
    SelfTransition { step: String },

    /// The initial pointer names no step
    #[error("Initial step '{0}' does not exist")]
    UnknownInitialStep(String),
}

impl FlowError {
    /// Create an unsupported format error
    pub fn unsupported_format(path: impl Into<String>) -> Self {
        Self::UnsupportedFormat(path.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
