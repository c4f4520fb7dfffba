// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging.
//!
//! Log lines are emitted through message structs in [`messages`] rather
//! than inline format strings. Each struct implements `Display` for the
//! human-readable line and [`messages::StructuredLog`] to emit it with
//! typed fields at a fixed level.
//!
//! # Subsystems
//! * `messages::engine` - workflow execution lifecycle
//! * `messages::task` - individual task outcomes
//! * `messages::cluster` - local cluster scheduler and workers
//! * `messages::cache` - modelfit result memoization
//! * `messages::tool` - tool runs and metadata persistence
//! * `messages::config` - configuration loading

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
