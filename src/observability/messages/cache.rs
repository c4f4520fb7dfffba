// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Stored fit reused instead of running the estimation tool. `info!`
pub struct CacheHit<'a> {
    pub model: &'a str,
}

impl Display for CacheHit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reusing stored fit results for model '{}'", self.model)
    }
}

impl StructuredLog for CacheHit<'_> {
    fn log(&self) {
        tracing::info!(model = self.model, "{}", self);
    }
}

/// `debug!`
pub struct CacheMiss<'a> {
    pub model: &'a str,
    pub reason: &'a str,
}

impl Display for CacheMiss<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No reusable fit for model '{}': {}", self.model, self.reason)
    }
}

impl StructuredLog for CacheMiss<'_> {
    fn log(&self) {
        tracing::debug!(model = self.model, reason = self.reason, "{}", self);
    }
}

/// `debug!`
pub struct FitStored<'a> {
    pub model: &'a str,
    pub database: &'a Path,
}

impl Display for FitStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stored fit of model '{}' in {}", self.model, self.database.display())
    }
}

impl StructuredLog for FitStored<'_> {
    fn log(&self) {
        tracing::debug!(model = self.model, database = %self.database.display(), "{}", self);
    }
}
