//! Multi-head classifier bank.
//!
//! A bank holds one independently trained [`RandomForestClassifier`] per
//! output attribute, all sharing the same input feature vectors. Heads share
//! no parameters; each head's train/predict/persist lifecycle is identical,
//! so the bank addresses them by attribute name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PaideiaError, Result};
use crate::forest::{FeatureVector, ForestConfig, RandomForestClassifier};

/// One attribute's training labels: codes into a vocabulary of `n_classes`.
#[derive(Debug, Clone)]
pub struct TargetColumn {
    /// Label codes, one per training row.
    pub codes: Vec<usize>,
    /// Size of the vocabulary the codes index into.
    pub n_classes: usize,
}

/// One head's raw prediction: a label code plus the full probability
/// distribution over that head's vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeadPrediction {
    /// Predicted label code.
    pub code: usize,
    /// Probability distribution over the vocabulary.
    pub distribution: Vec<f64>,
}

/// A fixed set of named, independently trained classification heads.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassifierBank {
    heads: BTreeMap<String, RandomForestClassifier>,
}

impl ClassifierBank {
    /// Train one head per target attribute on the shared feature matrix.
    ///
    /// # Errors
    ///
    /// - [`PaideiaError::InvalidInput`] when a target column's length does
    ///   not match the feature matrix
    /// - [`PaideiaError::InsufficientClasses`] when an attribute has fewer
    ///   than two distinct observed classes
    pub fn fit(
        config: &ForestConfig,
        x: &[FeatureVector],
        targets: &BTreeMap<String, TargetColumn>,
    ) -> Result<Self> {
        if targets.is_empty() {
            return Err(PaideiaError::invalid_input(
                "classifier bank requires at least one target attribute",
            ));
        }

        let mut heads = BTreeMap::new();
        for (attribute, column) in targets {
            if column.codes.len() != x.len() {
                return Err(PaideiaError::invalid_input(format!(
                    "attribute '{}' has {} labels for {} feature rows",
                    attribute,
                    column.codes.len(),
                    x.len()
                )));
            }

            let mut distinct: Vec<usize> = column.codes.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < 2 {
                return Err(PaideiaError::InsufficientClasses {
                    attribute: attribute.clone(),
                    found: distinct.len(),
                });
            }

            log::debug!(
                "fitting head '{}' over {} classes on {} rows",
                attribute,
                column.n_classes,
                x.len()
            );
            let mut forest = RandomForestClassifier::new(config.clone());
            forest.fit(x, &column.codes, column.n_classes)?;
            heads.insert(attribute.clone(), forest);
        }

        Ok(Self { heads })
    }

    /// Run every head on one feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<BTreeMap<String, HeadPrediction>> {
        if self.heads.is_empty() {
            return Err(PaideiaError::not_trained(
                "classifier bank has no fitted heads",
            ));
        }

        let mut predictions = BTreeMap::new();
        for (attribute, forest) in &self.heads {
            let (code, distribution) = forest.predict(features)?;
            predictions.insert(attribute.clone(), HeadPrediction { code, distribution });
        }
        Ok(predictions)
    }

    /// Attribute names of the fitted heads, in sorted order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.heads.keys().map(|k| k.as_str())
    }

    /// Whether every head has been fitted.
    pub fn is_trained(&self) -> bool {
        !self.heads.is_empty() && self.heads.values().all(|f| f.is_trained())
    }

    /// Feature vector length the heads were trained on.
    pub fn n_features(&self) -> Option<usize> {
        self.heads.values().next().map(|f| f.n_features())
    }
}
