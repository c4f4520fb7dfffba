// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use crate::observability::messages::StructuredLog;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub struct ConfigLoaded<'a> {
    pub path: &'a OsStr,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded configuration from {}", Path::new(self.path).display())
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(path = %Path::new(self.path).display(), "{}", self);
    }
}

/// Configuration file unusable; defaults are used instead. `warn!`
pub struct ConfigFallback<'a> {
    pub path: &'a OsStr,
    pub error: &'a ConfigError,
}

impl Display for ConfigFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring configuration {}: {}; using defaults",
            Path::new(self.path).display(),
            self.error
        )
    }
}

impl StructuredLog for ConfigFallback<'_> {
    fn log(&self) {
        tracing::warn!(path = %Path::new(self.path).display(), error = %self.error, "{}", self);
    }
}
