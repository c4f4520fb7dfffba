// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::model::Fingerprint;
use serde::{Deserialize, Serialize};

/// Numeric table a model is fitted against.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    /// Missing observations are NaN.
    #[serde(with = "crate::model::float::rows")]
    rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Content digest over column names and cell bit patterns. Every NaN
    /// hashes the same.
    ///
    /// Lengths are hashed ahead of each component so `["AB"]` and
    /// `["A", "B"]` cannot collide.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.columns.len() as u64).to_le_bytes());
        for column in &self.columns {
            hasher.update(&(column.len() as u64).to_le_bytes());
            hasher.update(column.as_bytes());
        }
        hasher.update(&(self.rows.len() as u64).to_le_bytes());
        for row in &self.rows {
            hasher.update(&(row.len() as u64).to_le_bytes());
            for cell in row {
                let bits = if cell.is_nan() { f64::NAN.to_bits() } else { cell.to_bits() };
                hasher.update(&bits.to_le_bytes());
            }
        }
        Fingerprint::from_hasher(&hasher)
    }
}
