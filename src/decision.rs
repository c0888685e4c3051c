//! Confidence-scored decision layer.
//!
//! Turns one head's raw prediction into a decoded label plus a confidence
//! score. Confidence is the top class probability expressed as a percentage;
//! it is always reported alongside the label so callers can apply their own
//! trust threshold. Low-confidence predictions are never suppressed here.

use serde::{Deserialize, Serialize};

use crate::bank::HeadPrediction;
use crate::error::Result;
use crate::labels::LabelVocabulary;

/// A decoded prediction for one output attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// Human-readable label.
    pub label: String,
    /// Top-class probability as a percentage in `[0, 100]`.
    pub confidence: u8,
}

/// Decode a head prediction against its matching output vocabulary.
pub fn resolve(head: &HeadPrediction, vocabulary: &LabelVocabulary) -> Result<Decision> {
    let label = vocabulary.decode(head.code)?.to_string();
    Ok(Decision {
        label,
        confidence: confidence_percent(&head.distribution),
    })
}

/// Top-class probability rounded to the nearest integer percentage.
pub fn confidence_percent(distribution: &[f64]) -> u8 {
    let max = distribution.iter().copied().fold(0.0_f64, f64::max);
    (max.clamp(0.0, 1.0) * 100.0).round() as u8
}
