// SPDX-License-Identifier: MIT

//! Content approval workflows: editing and encoding the step graph that
//! content items move through.

pub mod config;
pub mod error;
pub mod workflow;
