// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types, one enum per subsystem.
//!
//! Task bodies report failures as `anyhow::Error`; everything the engine,
//! the databases and the tool runner raise is a typed `thiserror` enum so
//! callers can match on the failure kind.

mod config;
mod database;
mod dispatch;
mod graph;
mod results;
mod tool;

pub use config::ConfigError;
pub use database::DatabaseError;
pub use dispatch::DispatchError;
pub use graph::GraphError;
pub use results::ResultsError;
pub use tool::ToolError;
