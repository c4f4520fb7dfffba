// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Workflow execution.
//!
//! [`execute_workflow`] is the entry point. Backends implement
//! [`Dispatcher`](crate::traits::Dispatcher):
//!
//! * [`ThreadedDispatcher`] - tokio blocking pool in the calling process
//! * [`DistributedDispatcher`] - scheduler service with worker threads,
//!   supporting nested workflow submission from inside tasks

mod context;
mod execute;
mod factory;
mod node;
pub mod distributed;
pub mod threaded;

#[cfg(test)]
mod integration_tests;

pub use context::TaskContext;
pub use distributed::{DistributedDispatcher, LocalCluster};
pub use execute::execute_workflow;
pub use factory::{default_dispatcher, DispatcherFactory};
pub use threaded::ThreadedDispatcher;
