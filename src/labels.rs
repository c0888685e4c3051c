//! Label vocabularies: bidirectional mapping between categorical labels and
//! small integer codes.
//!
//! One vocabulary is fitted per categorical attribute from the training
//! set's observed values, with codes assigned by first appearance. A
//! vocabulary is immutable after fitting; unseen values at encode time are
//! rejected with the full valid set so callers can recover, and out-of-range
//! codes at decode time signal an internal inconsistency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PaideiaError, Result};

/// Bijective mapping between one categorical attribute's string values and
/// integer codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelVocabulary {
    /// Attribute this vocabulary was fitted for (used in error messages).
    attribute: String,
    /// Labels in code order (code = position).
    labels: Vec<String>,
    /// Reverse lookup: label -> code.
    index: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Fit a vocabulary from observed values. Codes are assigned by first
    /// appearance; duplicates are ignored.
    pub fn fit<I, S>(attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = Vec::new();
        let mut index = HashMap::new();

        for value in values {
            let value = value.as_ref();
            if !index.contains_key(value) {
                index.insert(value.to_string(), labels.len());
                labels.push(value.to_string());
            }
        }

        Self {
            attribute: attribute.to_string(),
            labels,
            index,
        }
    }

    /// Encode a label to its integer code.
    ///
    /// # Errors
    ///
    /// Returns [`PaideiaError::UnknownCategory`] (carrying the full fitted
    /// vocabulary) if the label was not seen during fitting.
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| PaideiaError::UnknownCategory {
                attribute: self.attribute.clone(),
                value: label.to_string(),
                valid: self.labels.clone(),
            })
    }

    /// Decode an integer code back to its label.
    ///
    /// # Errors
    ///
    /// Returns [`PaideiaError::InvalidCode`] if the code is out of range.
    pub fn decode(&self, code: usize) -> Result<&str> {
        self.labels
            .get(code)
            .map(|s| s.as_str())
            .ok_or(PaideiaError::InvalidCode {
                code,
                size: self.labels.len(),
            })
    }

    /// The attribute name this vocabulary was fitted for.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// All fitted labels in code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
