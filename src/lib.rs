// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // YAML config + process-wide defaults
pub mod database;      // local model / tool databases
pub mod engine;        // dispatchers and workflow execution
pub mod errors;        // error handling
pub mod model;         // models, datasets, fit results
pub mod observability; // structured logging
pub mod results;       // tool results envelope
pub mod tools;         // tool registry, runner, modelfit
pub mod traits;        // unified abstractions
pub mod workflow;      // tasks and workflow graphs

pub use engine::execute_workflow;
pub use tools::{fit, run_tool, ToolCall};
pub use workflow::{Task, Value, Workflow};
