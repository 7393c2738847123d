// SPDX-License-Identifier: MIT

//! Decode configuration read from the environment

use std::env::{self, VarError};

use crate::error::FlowError;

/// Environment variable listing step names that decode as locked
pub const LOCKED_STEPS_ENV: &str = "APPROVAL_FLOW_LOCKED_STEPS";

/// Options controlling how wire workflows are decoded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Step names that are locked regardless of their wire `isLocked` flag
    pub implicitly_locked: Vec<String>,
}

impl DecodeOptions {
    /// Locks any step named "Published", matching older servers that never
    /// sent the flag for it.
    pub fn legacy() -> Self {
        Self {
            implicitly_locked: vec!["Published".to_string()],
        }
    }

    /// Read options from `APPROVAL_FLOW_LOCKED_STEPS`; unset means none
    pub fn from_env() -> Result<Self, FlowError> {
        match env::var(LOCKED_STEPS_ENV) {
            Ok(value) => Ok(Self::from_list(&value)),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(_)) => Err(FlowError::config(format!(
                "{} is not valid unicode",
                LOCKED_STEPS_ENV
            ))),
        }
    }

    /// Parse a comma-separated list of step names
    pub fn from_list(value: &str) -> Self {
        let implicitly_locked = value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        Self { implicitly_locked }
    }

    pub fn is_implicitly_locked(&self, step_name: &str) -> bool {
        self.implicitly_locked.iter().any(|name| name == step_name)
    }
}
