// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Failed to read results file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Results serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Results fields must serialize to a JSON object")]
    NotAnObject,

    #[error("Expected results of tool '{expected}', found '{found}'")]
    ToolMismatch { expected: String, found: String },
}
