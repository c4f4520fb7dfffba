// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{self, Config, DispatcherKind};
use crate::engine::distributed::DistributedDispatcher;
use crate::engine::threaded::ThreadedDispatcher;
use crate::traits::Dispatcher;

/// Factory for creating dispatchers from configuration
pub struct DispatcherFactory;

impl DispatcherFactory {
    /// Create the dispatcher named by `cfg.dispatcher`.
    ///
    /// The configured backend is used as is; if it cannot start, the run
    /// fails rather than switching to the other backend.
    pub fn from_config(cfg: &Config) -> Arc<dyn Dispatcher> {
        match cfg.dispatcher {
            DispatcherKind::Threaded => Arc::new(ThreadedDispatcher::new(cfg.executor_options.max_concurrency())),
            DispatcherKind::Distributed => Arc::new(DistributedDispatcher::new(cfg.executor_options.workers())),
        }
    }
}

/// Dispatcher built from the global configuration.
pub fn default_dispatcher() -> Arc<dyn Dispatcher> {
    DispatcherFactory::from_config(&config::global())
}
