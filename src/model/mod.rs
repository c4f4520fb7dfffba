// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pharmacometric model records.
//!
//! A [`Model`] is an opaque definition (its control-stream `code`), an
//! optional [`Dataset`], and the [`ModelfitResults`] of its latest fit. The
//! engine never interprets `code`; it only fingerprints it to decide whether
//! two models are the same fit problem.

mod dataset;
mod fingerprint;
mod fit_results;
mod float;

pub use dataset::Dataset;
pub use fingerprint::Fingerprint;
pub use fit_results::ModelfitResults;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    name: String,
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset: Option<Dataset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modelfit_results: Option<ModelfitResults>,
}

impl Model {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            dataset: None,
            modelfit_results: None,
        }
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn set_dataset(&mut self, dataset: Option<Dataset>) {
        self.dataset = dataset;
    }

    pub fn modelfit_results(&self) -> Option<&ModelfitResults> {
        self.modelfit_results.as_ref()
    }

    pub fn set_modelfit_results(&mut self, results: Option<ModelfitResults>) {
        self.modelfit_results = results;
    }

    /// Digest of the model definition. The name is not part of it.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_text(&self.code)
    }

    pub fn has_same_dataset_as(&self, other: &Model) -> bool {
        match (&self.dataset, &other.dataset) {
            (None, None) => true,
            (Some(a), Some(b)) => a.fingerprint() == b.fingerprint(),
            _ => false,
        }
    }

    /// Same definition and same data, so a stored fit of `other` is a valid
    /// fit of `self`.
    pub fn is_equivalent_to(&self, other: &Model) -> bool {
        self.fingerprint() == other.fingerprint() && self.has_same_dataset_as(other)
    }

    /// Detached copy, fit results included.
    pub fn copy(&self) -> Model {
        self.clone()
    }

    /// Renamed copy. A renamed model is a new fit problem, so it carries no
    /// fit results.
    pub fn copy_as(&self, name: impl Into<String>) -> Model {
        Model {
            name: name.into(),
            modelfit_results: None,
            ..self.clone()
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Model {}>", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pheno() -> Model {
        Model::new("pheno", "$PROBLEM pheno\n$THETA (0,0.1)\n").with_dataset(Dataset::new(
            vec!["ID".into(), "TIME".into(), "DV".into()],
            vec![vec![1.0, 0.0, 17.3], vec![1.0, 2.0, 31.0]],
        ))
    }

    #[test]
    fn equivalence_ignores_name_and_results() {
        let a = pheno();
        let mut b = a.copy_as("pheno_copy");
        b.set_modelfit_results(Some(ModelfitResults::with_ofv(-10.0)));

        assert!(a.is_equivalent_to(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn different_code_is_not_equivalent() {
        let a = pheno();
        let b = Model::new("pheno", "$PROBLEM other\n").with_dataset(a.dataset().unwrap().clone());

        assert!(!a.is_equivalent_to(&b));
        assert!(a.has_same_dataset_as(&b));
    }

    #[test]
    fn different_dataset_is_not_equivalent() {
        let a = pheno();
        let mut b = a.copy();
        b.set_dataset(Some(Dataset::new(vec!["ID".into()], vec![vec![2.0]])));
        assert!(!a.is_equivalent_to(&b));

        b.set_dataset(None);
        assert!(!a.is_equivalent_to(&b));
    }

    #[test]
    fn copy_as_drops_fit_results() {
        let mut a = pheno();
        a.set_modelfit_results(Some(ModelfitResults::with_ofv(1.0)));

        assert_eq!(a.copy(), a);
        let b = a.copy_as("input_model");
        assert!(b.modelfit_results().is_none());
        assert_eq!(b.name(), "input_model");
        assert_eq!(a.to_string(), "<Model pheno>");
    }
}
