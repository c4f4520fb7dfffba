// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tools: named workflow factories and the machinery that runs them.
//!
//! A tool declares its parameters and builds a [`Workflow`](crate::workflow::Workflow)
//! from resolved [`ToolOptions`]. [`run_tool`] looks the tool up in the
//! registry, records run metadata in a tool database and executes the
//! workflow. The built-in `modelfit` tool fits models, reusing stored fits
//! where it can.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), pharmflow::errors::ToolError> {
//! use pharmflow::model::Model;
//! use pharmflow::tools::{fit, ToolCall};
//!
//! let models = fit(vec![Model::new("run1", "$PROBLEM base")], Some("nonmem"), ToolCall::new()).await?;
//! println!("{:?}", models[0].modelfit_results());
//! # Ok(())
//! # }
//! ```

mod estimation;
mod metadata;
mod modelfit;
mod options;
mod registry;
mod retrieve;
mod runner;


pub use estimation::{estimation_tool, register_estimation_tool, CommandEstimationTool};
pub use metadata::{CommonOptionsRecord, RunStats, ToolMetadata};
pub use modelfit::{
    create_fit_workflow, insert_fit_workflow, retrieve_from_database_or_execute_model_with_tool, FitTargets,
    Modelfit, MODELFIT,
};
pub use options::{CommonOptions, ToolCall, ToolOptions};
pub use registry::{lookup_tool, register_tool, ToolRegistry};
pub use retrieve::{retrieve_final_model, retrieve_models, ModelSource};
pub use runner::{fit, run_tool, ToolRunner};
