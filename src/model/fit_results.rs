// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one estimation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelfitResults {
    /// Objective function value.
    #[serde(default, with = "crate::model::float::option")]
    pub ofv: Option<f64>,
    #[serde(default, with = "crate::model::float::map")]
    pub parameter_estimates: BTreeMap<String, f64>,
    #[serde(default)]
    pub minimization_successful: Option<bool>,
    #[serde(default, with = "crate::model::float::option")]
    pub runtime_seconds: Option<f64>,
}

impl ModelfitResults {
    pub fn with_ofv(ofv: f64) -> Self {
        Self {
            ofv: Some(ofv),
            minimization_successful: Some(true),
            ..Default::default()
        }
    }
}
