// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task graphs.
//!
//! Tools build a [`Workflow`] out of [`Task`]s, possibly by composing
//! smaller workflows with [`Workflow::insert_workflow`]. Execution works on
//! the frozen [`ExecutableGraph`].

mod builder;
mod graph;
mod task;
mod validation;
mod value;

pub use builder::Workflow;
pub use graph::{ArgRef, ExecutableGraph, ExecutableNode};
pub use task::{Task, TaskFn, TaskId};
pub use value::Value;
