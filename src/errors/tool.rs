// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{DatabaseError, DispatchError, GraphError, ResultsError};
use thiserror::Error;

/// Errors from resolving, building and running tools.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool '{name}'")]
    UnknownTool { name: String },

    #[error("Unknown estimation tool '{name}'")]
    UnknownEstimationTool { name: String },

    #[error("{tool}: '{param}' was not set")]
    MissingParameter { tool: String, param: String },

    #[error("{tool}: got {given} positional arguments but only {declared} parameters are declared")]
    TooManyArguments {
        tool: String,
        given: usize,
        declared: usize,
    },

    #[error("{tool}: unexpected argument '{name}'")]
    UnexpectedArgument { tool: String, name: String },

    #[error("{tool}: '{name}' given both positionally and by keyword")]
    DuplicateArgument { tool: String, name: String },

    #[error("{tool}: invalid value for '{param}': {reason}")]
    InvalidOption {
        tool: String,
        param: String,
        reason: String,
    },

    /// The workflow finished but its output is not what the caller asked for.
    #[error("Tool '{tool}' returned an unexpected value: {reason}")]
    UnexpectedOutput { tool: String, reason: String },

    #[error("Cannot locate models: {reason}")]
    NoModelSource { reason: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Results(#[from] ResultsError),
}
