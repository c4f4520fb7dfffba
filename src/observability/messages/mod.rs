// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging, grouped by subsystem.
//!
//! # Usage Pattern
//!
//! ```rust
//! use pharmflow::observability::messages::cache::CacheMiss;
//! use pharmflow::observability::messages::StructuredLog;
//!
//! CacheMiss { model: "run1", reason: "not in database" }.log();
//! ```

pub mod cache;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod task;
pub mod tool;

use tracing::Span;

/// A message that knows its own level and fields.
pub trait StructuredLog {
    fn log(&self);

    /// Span carrying the message's fields, for instrumenting the work the
    /// message announces.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
