// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by model and tool databases.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No model named '{name}' in database")]
    ModelNotFound { name: String },

    #[error("No fit results stored for model '{name}'")]
    ResultsNotFound { name: String },

    /// Model names become directory names and must be a single path component.
    #[error("Invalid model name '{name}'")]
    InvalidName { name: String },

    #[error("Database directory {path} already exists")]
    AlreadyExists { path: PathBuf },

    #[error("Database directory {path} does not exist")]
    Missing { path: PathBuf },
}

impl DatabaseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DatabaseError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        DatabaseError::Json {
            path: path.into(),
            source,
        }
    }

    /// True when the error only means "nothing stored yet".
    ///
    /// The memoized fit task treats these as a cache miss and falls back to
    /// running the estimation tool; everything else is a real failure.
    pub fn is_cache_miss(&self) -> bool {
        match self {
            DatabaseError::ModelNotFound { .. } | DatabaseError::ResultsNotFound { .. } => true,
            DatabaseError::Io { source, .. } => source.kind() == ErrorKind::NotFound,
            _ => false,
        }
    }
}
