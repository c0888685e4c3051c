//! Query understanding service.
//!
//! Classifies a free-text student query into intent, topic, and difficulty,
//! each with a confidence score, and attaches extracted keywords plus a
//! canned pedagogical suggestion. The pipeline is encode (text embedding) →
//! multi-head classify → decode with confidence → explain.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::extract_keywords;
use crate::bank::{ClassifierBank, TargetColumn};
use crate::bundle::{BundleSlot, load_bundle, save_bundle};
use crate::decision::{Decision, resolve};
use crate::embedding::{DEFAULT_DIMENSION, HashingTextEmbedder, TextEmbedder};
use crate::error::{PaideiaError, Result};
use crate::explain::suggestion_for_intent;
use crate::forest::{FeatureVector, ForestConfig};
use crate::labels::LabelVocabulary;

/// Service identifier recorded in persisted bundles.
pub const QUERY_SERVICE: &str = "query-understanding";

/// Predicted attribute names.
pub const ATTR_INTENT: &str = "intent";
pub const ATTR_TOPIC: &str = "topic";
pub const ATTR_DIFFICULTY: &str = "difficulty";

/// One labeled training row for the query service. Unknown columns in the
/// source data are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySample {
    /// Raw query text.
    pub query: String,
    /// Ground-truth intent label.
    pub intent: String,
    /// Ground-truth topic label.
    pub topic: String,
    /// Ground-truth difficulty label.
    pub difficulty: String,
}

/// Structured analysis of one student query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryAnalysis {
    /// Predicted intent with confidence.
    pub intent: Decision,
    /// Predicted topic with confidence.
    pub topic: Decision,
    /// Predicted difficulty with confidence.
    pub difficulty: Decision,
    /// Up to five content-bearing keywords from the query.
    pub keywords: Vec<String>,
    /// Canned pedagogical instruction for the predicted intent.
    pub suggestion: String,
}

/// Trained state for the query service: three classification heads over a
/// shared text embedding, plus one output vocabulary per head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryBundle {
    /// Embedding dimension the bank was trained on.
    pub embedder_dimension: usize,
    /// Name of the embedder used at training time.
    pub embedder_name: String,
    /// The three fitted heads.
    pub bank: ClassifierBank,
    /// Output vocabularies, keyed by attribute name.
    pub vocabularies: BTreeMap<String, LabelVocabulary>,
}

/// Configuration for [`QueryUnderstandingModel`].
#[derive(Debug, Clone)]
pub struct QueryModelConfig {
    /// Where the trained bundle is persisted.
    pub bundle_path: PathBuf,
    /// Forest hyperparameters shared by all heads.
    pub forest: ForestConfig,
    /// Text embedding dimension.
    pub embedder_dimension: usize,
}

impl Default for QueryModelConfig {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from("models/query_bundle.json"),
            forest: ForestConfig::default(),
            embedder_dimension: DEFAULT_DIMENSION,
        }
    }
}

/// Query understanding model: trains, persists, restores, and serves the
/// intent/topic/difficulty classifier bank.
#[derive(Debug)]
pub struct QueryUnderstandingModel {
    config: QueryModelConfig,
    embedder: HashingTextEmbedder,
    slot: BundleSlot<QueryBundle>,
}

impl QueryUnderstandingModel {
    /// Create a model with the given configuration. No bundle is resident
    /// until [`train`](Self::train) or [`load`](Self::load) succeeds.
    pub fn new(config: QueryModelConfig) -> Result<Self> {
        let embedder = HashingTextEmbedder::with_dimension(config.embedder_dimension)?;
        Ok(Self {
            config,
            embedder,
            slot: BundleSlot::new(),
        })
    }

    /// Train all three heads from labeled samples, persist the bundle, and
    /// swap it in. All-or-nothing: on any failure the previous bundle (if
    /// any) stays resident and nothing is persisted.
    pub fn train(&self, samples: &[QuerySample]) -> Result<()> {
        if samples.is_empty() {
            return Err(PaideiaError::schema("query training dataset is empty"));
        }

        log::info!("encoding {} training queries", samples.len());
        let x: Vec<FeatureVector> = samples
            .iter()
            .map(|s| self.embedder.embed(&s.query))
            .collect::<Result<_>>()?;

        let vocabularies = BTreeMap::from([
            (
                ATTR_INTENT.to_string(),
                LabelVocabulary::fit(ATTR_INTENT, samples.iter().map(|s| s.intent.as_str())),
            ),
            (
                ATTR_TOPIC.to_string(),
                LabelVocabulary::fit(ATTR_TOPIC, samples.iter().map(|s| s.topic.as_str())),
            ),
            (
                ATTR_DIFFICULTY.to_string(),
                LabelVocabulary::fit(
                    ATTR_DIFFICULTY,
                    samples.iter().map(|s| s.difficulty.as_str()),
                ),
            ),
        ]);

        let mut targets = BTreeMap::new();
        for (attribute, vocabulary) in &vocabularies {
            let codes = samples
                .iter()
                .map(|s| {
                    let value = match attribute.as_str() {
                        ATTR_INTENT => &s.intent,
                        ATTR_TOPIC => &s.topic,
                        _ => &s.difficulty,
                    };
                    vocabulary.encode(value)
                })
                .collect::<Result<Vec<usize>>>()?;
            targets.insert(
                attribute.clone(),
                TargetColumn {
                    codes,
                    n_classes: vocabulary.len(),
                },
            );
        }

        log::info!("training query classifier bank on {} rows", x.len());
        let bank = ClassifierBank::fit(&self.config.forest, &x, &targets)?;

        let bundle = QueryBundle {
            embedder_dimension: self.embedder.dimension(),
            embedder_name: self.embedder.name().to_string(),
            bank,
            vocabularies,
        };

        save_bundle(&self.config.bundle_path, QUERY_SERVICE, &bundle)?;
        self.slot.replace(bundle);
        Ok(())
    }

    /// Analyze one student query.
    ///
    /// # Errors
    ///
    /// - [`PaideiaError::InvalidInput`] on an empty or blank query
    /// - [`PaideiaError::ModelNotTrained`] when no bundle is resident
    pub fn analyze(&self, query: &str) -> Result<QueryAnalysis> {
        if query.trim().is_empty() {
            return Err(PaideiaError::invalid_input("query must not be empty"));
        }

        let bundle = self.slot.get().ok_or_else(|| {
            PaideiaError::not_trained("query model has no trained bundle; train or load one first")
        })?;

        let features = self.embedder.embed(query)?;
        let predictions = bundle.bank.predict(&features)?;

        let intent = Self::resolve_head(&bundle, &predictions, ATTR_INTENT)?;
        let topic = Self::resolve_head(&bundle, &predictions, ATTR_TOPIC)?;
        let difficulty = Self::resolve_head(&bundle, &predictions, ATTR_DIFFICULTY)?;

        let suggestion = suggestion_for_intent(&intent.label).to_string();
        let keywords = extract_keywords(query);

        Ok(QueryAnalysis {
            intent,
            topic,
            difficulty,
            keywords,
            suggestion,
        })
    }

    fn resolve_head(
        bundle: &QueryBundle,
        predictions: &BTreeMap<String, crate::bank::HeadPrediction>,
        attribute: &str,
    ) -> Result<Decision> {
        let head = predictions
            .get(attribute)
            .ok_or_else(|| PaideiaError::internal(format!("missing head '{attribute}'")))?;
        let vocabulary = bundle
            .vocabularies
            .get(attribute)
            .ok_or_else(|| PaideiaError::internal(format!("missing vocabulary '{attribute}'")))?;
        resolve(head, vocabulary)
    }

    /// Restore the persisted bundle, if present. Returns whether a bundle
    /// is now resident.
    pub fn load(&self) -> Result<bool> {
        match load_bundle::<QueryBundle>(&self.config.bundle_path, QUERY_SERVICE)? {
            Some(bundle) => {
                if bundle.embedder_dimension != self.embedder.dimension() {
                    return Err(PaideiaError::invalid_input(format!(
                        "bundle was trained with embedding dimension {}, configured {}",
                        bundle.embedder_dimension,
                        self.embedder.dimension()
                    )));
                }
                self.slot.replace(bundle);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a trained bundle is resident and predictions are available.
    pub fn is_ready(&self) -> bool {
        self.slot.is_loaded()
    }
}

/// Load query training samples from a JSON file (an array of objects with
/// `query`, `intent`, `topic`, and `difficulty` columns).
pub fn load_query_samples(path: &Path) -> Result<Vec<QuerySample>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|err| PaideiaError::schema(format!("query training data: {err}")))
}
